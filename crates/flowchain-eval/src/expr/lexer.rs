//! Tokenizer for the equation grammar.

use crate::error::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Var,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Number(v) => format!("number {}", v),
            Token::Var => "'x'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

/// A token and the byte offset it starts at.
pub(crate) type Spanned = (Token, usize);

pub(crate) fn tokenize(input: &str) -> Result<Vec<Spanned>, ExprError> {
    let mut chars = input.char_indices().peekable();
    let mut tokens = Vec::new();
    while let Some(&(offset, ch)) = chars.peek() {
        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            'x' => Token::Var,
            ch if ch.is_whitespace() => {
                chars.next();
                continue;
            }
            ch if ch.is_ascii_digit() || ch == '.' => {
                let mut raw = String::new();
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_ascii_digit() || next == '.' {
                        raw.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = raw.parse::<f64>().map_err(|_| ExprError::InvalidNumber {
                    text: raw.clone(),
                    offset,
                })?;
                tokens.push((Token::Number(value), offset));
                continue;
            }
            other => return Err(ExprError::UnexpectedChar { ch: other, offset }),
        };
        chars.next();
        tokens.push((token, offset));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn tokenizes_coefficient_and_power() {
        assert_eq!(
            kinds("2x^2 + 4"),
            vec![
                Token::Number(2.0),
                Token::Var,
                Token::Caret,
                Token::Number(2.0),
                Token::Plus,
                Token::Number(4.0),
            ]
        );
    }

    #[test]
    fn decimals_in_all_shapes() {
        assert_eq!(kinds("1.5"), vec![Token::Number(1.5)]);
        assert_eq!(kinds(".5"), vec![Token::Number(0.5)]);
        assert_eq!(kinds("5."), vec![Token::Number(5.0)]);
    }

    #[test]
    fn offsets_skip_whitespace() {
        let tokens = tokenize("  x -  3").unwrap();
        let offsets: Vec<usize> = tokens.iter().map(|(_, o)| *o).collect();
        assert_eq!(offsets, vec![2, 4, 7]);
    }

    #[test]
    fn malformed_number() {
        assert_eq!(
            tokenize("x + 1.2.3").unwrap_err(),
            ExprError::InvalidNumber {
                text: "1.2.3".to_string(),
                offset: 4,
            }
        );
        assert!(matches!(
            tokenize(".").unwrap_err(),
            ExprError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn foreign_character() {
        assert_eq!(
            tokenize("x % 2").unwrap_err(),
            ExprError::UnexpectedChar { ch: '%', offset: 2 }
        );
    }
}
