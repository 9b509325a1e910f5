//! WorkflowService: the single coordinator between HTTP handlers and the
//! session.
//!
//! Handlers are thin wrappers that delegate to these methods and return the
//! schema types unchanged.

use flowchain_core::NodeId;
use flowchain_route::{classify, Router, RouterConfig};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::schema::actions::ActionResponse;
use crate::schema::evaluate::{EvaluateRequest, EvaluateResponse};
use crate::schema::route::{RouteRequest, RouteResponse};
use crate::schema::workflow::{NodeView, OptionsResponse, WorkflowResponse};
use crate::session::{Action, Frame, Session};

pub struct WorkflowService {
    session: Session,
}

impl WorkflowService {
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let session = Session::from_config(config)?;
        tracing::info!(
            policy = ?config.policy,
            wired = config.wired,
            initial_value = config.initial_value,
            "workflow session ready"
        );
        Ok(WorkflowService { session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn workflow(&self) -> WorkflowResponse {
        let graph = self.session.graph();
        let chain = graph.chain();
        WorkflowResponse {
            nodes: graph
                .nodes()
                .map(|node| NodeView {
                    id: node.id(),
                    equation: node.equation().to_string(),
                    successor: node.successor(),
                    predecessor: node.predecessor(),
                })
                .collect(),
            initial_value: self.session.initial_value(),
            policy: graph.policy().clone(),
            revision: graph.revision(),
            chain: chain.nodes,
            complete: chain.complete,
        }
    }

    pub fn frame(&self) -> Frame {
        self.session.frame().clone()
    }

    pub fn options(&self, node: NodeId) -> Result<OptionsResponse, ApiError> {
        Ok(OptionsResponse {
            node,
            options: self.session.dropdown_options(node)?,
        })
    }

    pub fn dispatch(&mut self, action: Action) -> Result<ActionResponse, ApiError> {
        let outcome = self.session.dispatch(action)?;
        Ok(ActionResponse {
            outcome,
            frame: self.session.frame().clone(),
        })
    }

    pub fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateResponse, ApiError> {
        let initial_value = request
            .initial_value
            .unwrap_or_else(|| self.session.initial_value());
        if !initial_value.is_finite() {
            return Err(ApiError::BadRequest(format!(
                "initial value must be finite, got {}",
                initial_value
            )));
        }
        let evaluation = self.session.evaluate_with(initial_value, request.trace);
        Ok(EvaluateResponse {
            output: evaluation.output(),
            evaluation,
        })
    }
}

/// Routes one connector. Needs no session state.
pub fn route(request: RouteRequest) -> Result<RouteResponse, ApiError> {
    let defaults = RouterConfig::default();
    let config = RouterConfig::new(
        request.threshold.unwrap_or(defaults.alignment_threshold),
        request.curvature.unwrap_or(defaults.curvature),
    )?;
    let path = Router::new(config).route(request.start, request.end, request.is_terminal);
    Ok(RouteResponse {
        kind: classify(
            request.start,
            request.end,
            request.is_terminal,
            config.alignment_threshold,
        ),
        svg: path.to_string(),
        path,
    })
}
