//! The session coordinator: one owner for all workflow and UI state.
//!
//! [`Session::dispatch`] is the only way state changes. It applies one
//! [`Action`], then refreshes the evaluation (when the graph revision or the
//! initial value moved) and rebuilds the [`Frame`]. Rejected actions leave
//! every field untouched.

use flowchain_core::{
    AppliedChange, CoreError, LinkPolicy, LinkRejection, LinkTarget, NodeId, Port,
    Successor, WorkflowGraph,
};
use flowchain_eval::{ChainEvaluator, EvalConfig, Evaluation};
use flowchain_route::{PathDescription, Point, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ServerConfig;
use crate::layout::{AnchorRef, BoxRef, Layout};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("initial value must be a finite number, got {0}")]
    InvalidInitialValue(f64),
}

/// Every state transition a client can request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    SetInitialValue { value: f64 },
    SetEquation { node: NodeId, equation: String },
    /// Pick an entry from a node's next-function dropdown.
    SelectSuccessor { node: NodeId, target: LinkTarget },
    ToggleDropdown { node: NodeId },
    CloseDropdown,
    /// Click on an anchor dot: removes the link attached there.
    ClickAnchor { anchor: AnchorRef },
    DragStart { anchor: AnchorRef },
    DragMove { to: Point },
    /// Release. `target` is the anchor under the pointer, if any.
    DragEnd { target: Option<AnchorRef> },
    /// Global pointer-up: cancels any drag in progress.
    PointerUp,
    /// Moves a box so its top-left corner sits at `to`.
    MoveNode { owner: BoxRef, to: Point },
}

/// What a dispatch did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// `true` if any state changed.
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<AppliedChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<LinkRejection>,
    /// The equation text failed the grammar check and was not applied.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub equation_rejected: bool,
    pub revision: u64,
}

impl DispatchOutcome {
    fn applied() -> Self {
        DispatchOutcome {
            applied: true,
            ..Default::default()
        }
    }

    fn ignored() -> Self {
        DispatchOutcome::default()
    }

    fn from_link(result: Result<AppliedChange, LinkRejection>) -> Self {
        match result {
            Ok(change) => DispatchOutcome {
                applied: change.changed,
                change: Some(change),
                ..Default::default()
            },
            Err(rejection) => {
                tracing::debug!(%rejection, "link rejected");
                DispatchOutcome {
                    rejection: Some(rejection),
                    ..Default::default()
                }
            }
        }
    }
}

/// An in-progress drag-to-connect gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    pub anchor: AnchorRef,
    pub cursor: Point,
}

/// One entry in a node's next-function dropdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub target: LinkTarget,
    pub label: String,
    pub disabled: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub from: BoxRef,
    pub to: BoxRef,
    pub path: PathDescription,
    pub svg: String,
    pub is_terminal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragPreview {
    pub anchor: AnchorRef,
    pub path: PathDescription,
    pub svg: String,
    pub is_terminal: bool,
}

/// Everything the renderer draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub revision: u64,
    /// Node links in node-id order, then the initial value link.
    pub connectors: Vec<Connector>,
    pub drag_preview: Option<DragPreview>,
    /// Last output that reached FINAL. Kept while the chain is unwired or
    /// dangling.
    pub final_output: Option<f64>,
    /// `true` if the current graph reaches FINAL.
    pub output_ready: bool,
    pub open_dropdown: Option<NodeId>,
}

pub struct Session {
    graph: WorkflowGraph,
    initial_value: f64,
    layout: Layout,
    router: Router,
    eval_config: EvalConfig,
    open_dropdown: Option<NodeId>,
    drag: Option<DragState>,
    evaluation: Evaluation,
    evaluated_at: (u64, u64),
    final_output: Option<f64>,
    frame: Frame,
}

impl Session {
    pub fn new(graph: WorkflowGraph, initial_value: f64) -> Self {
        let layout = Layout::row(graph.node_ids());
        let evaluation = ChainEvaluator::new(&graph, EvalConfig::default()).run(initial_value);
        let mut session = Session {
            evaluated_at: (graph.revision(), initial_value.to_bits()),
            final_output: evaluation.output(),
            graph,
            initial_value,
            layout,
            router: Router::default(),
            eval_config: EvalConfig::default(),
            open_dropdown: None,
            drag: None,
            evaluation,
            frame: Frame {
                revision: 0,
                connectors: Vec::new(),
                drag_preview: None,
                final_output: None,
                output_ready: false,
                open_dropdown: None,
            },
        };
        session.frame = session.build_frame();
        session
    }

    /// Builds the startup session: the seed graph, wired in the fixed order
    /// when `config.wired` is set.
    pub fn from_config(config: &ServerConfig) -> Result<Self, SessionError> {
        if !config.initial_value.is_finite() {
            return Err(SessionError::InvalidInitialValue(config.initial_value));
        }
        let graph = if config.wired {
            WorkflowGraph::with_default_chain(config.policy.clone()).map_err(|rejection| {
                CoreError::GraphInconsistency {
                    reason: format!("default chain rejected: {}", rejection),
                }
            })?
        } else {
            WorkflowGraph::seeded(config.policy.clone())
        };
        Ok(Session::new(graph, config.initial_value))
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn policy(&self) -> &LinkPolicy {
        self.graph.policy()
    }

    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn open_dropdown(&self) -> Option<NodeId> {
        self.open_dropdown
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Evaluates the current graph from any initial value without touching
    /// session state.
    pub fn evaluate_with(&self, initial_value: f64, trace: bool) -> Evaluation {
        ChainEvaluator::new(&self.graph, EvalConfig { trace_enabled: trace }).run(initial_value)
    }

    /// Dropdown entries for `node`: `None`, every other node, and
    /// `Final Output` unless another node already feeds FINAL.
    pub fn dropdown_options(&self, node: NodeId) -> Result<Vec<DropdownOption>, CoreError> {
        let current = self
            .graph
            .node(node)
            .ok_or(CoreError::NodeNotFound { id: node })?
            .successor();
        let current = LinkTarget::from(current);

        let mut options = vec![self.option(node, LinkTarget::None, "None".to_string(), current)];
        for other in self.graph.node_ids().filter(|id| *id != node) {
            options.push(self.option(
                node,
                LinkTarget::Node(other),
                format!("Function: {}", other),
                current,
            ));
        }
        if self.graph.final_node().map_or(true, |holder| holder == node) {
            options.push(self.option(
                node,
                LinkTarget::Final,
                "Final Output".to_string(),
                current,
            ));
        }
        Ok(options)
    }

    fn option(
        &self,
        node: NodeId,
        target: LinkTarget,
        label: String,
        current: LinkTarget,
    ) -> DropdownOption {
        DropdownOption {
            target,
            label,
            disabled: self.graph.check_link(node, target).is_err(),
            selected: target == current,
        }
    }

    /// Applies one action and refreshes derived state.
    pub fn dispatch(&mut self, action: Action) -> Result<DispatchOutcome, SessionError> {
        tracing::debug!(?action, "dispatch");
        let mut outcome = self.apply(action)?;
        self.refresh();
        outcome.revision = self.graph.revision();
        Ok(outcome)
    }

    fn apply(&mut self, action: Action) -> Result<DispatchOutcome, SessionError> {
        match action {
            Action::SetInitialValue { value } => {
                if !value.is_finite() {
                    return Err(SessionError::InvalidInitialValue(value));
                }
                if value == self.initial_value {
                    return Ok(DispatchOutcome::ignored());
                }
                self.initial_value = value;
                Ok(DispatchOutcome::applied())
            }
            Action::SetEquation { node, equation } => {
                let before = self.graph.revision();
                if self.graph.set_equation(node, &equation)? {
                    Ok(DispatchOutcome {
                        applied: self.graph.revision() != before,
                        ..Default::default()
                    })
                } else {
                    Ok(DispatchOutcome {
                        equation_rejected: true,
                        ..Default::default()
                    })
                }
            }
            Action::SelectSuccessor { node, target } => {
                let outcome = DispatchOutcome::from_link(self.graph.propose_link(node, target));
                if outcome.rejection.is_none() {
                    self.open_dropdown = None;
                    return Ok(DispatchOutcome {
                        applied: true,
                        ..outcome
                    });
                }
                Ok(outcome)
            }
            Action::ToggleDropdown { node } => {
                if !self.graph.contains(node) {
                    return Err(CoreError::NodeNotFound { id: node }.into());
                }
                self.open_dropdown = match self.open_dropdown {
                    Some(open) if open == node => None,
                    _ => Some(node),
                };
                Ok(DispatchOutcome::applied())
            }
            Action::CloseDropdown => Ok(match self.open_dropdown.take() {
                Some(_) => DispatchOutcome::applied(),
                None => DispatchOutcome::ignored(),
            }),
            Action::ClickAnchor { anchor } => self.click_anchor(anchor),
            Action::DragStart { anchor } => {
                let Some(origin) = self.layout.locate_anchor(anchor) else {
                    tracing::debug!(?anchor, "drag started on an anchor that is not rendered");
                    return Ok(DispatchOutcome::ignored());
                };
                self.drag = Some(DragState {
                    anchor,
                    cursor: origin,
                });
                Ok(DispatchOutcome::applied())
            }
            Action::DragMove { to } => match self.drag.as_mut() {
                Some(drag) => {
                    drag.cursor = to;
                    Ok(DispatchOutcome::applied())
                }
                None => Ok(DispatchOutcome::ignored()),
            },
            Action::DragEnd { target } => {
                let Some(drag) = self.drag.take() else {
                    return Ok(DispatchOutcome::ignored());
                };
                let Some(target) = target else {
                    return Ok(DispatchOutcome::applied());
                };
                Ok(match self.resolve_drag(drag.anchor, target) {
                    Some(result) => {
                        let outcome = DispatchOutcome::from_link(result);
                        DispatchOutcome {
                            applied: true,
                            ..outcome
                        }
                    }
                    None => {
                        tracing::debug!(from = ?drag.anchor, to = ?target, "drag released on an incompatible anchor");
                        DispatchOutcome::applied()
                    }
                })
            }
            Action::PointerUp => Ok(match self.drag.take() {
                Some(_) => DispatchOutcome::applied(),
                None => DispatchOutcome::ignored(),
            }),
            Action::MoveNode { owner, to } => {
                if let BoxRef::Node(id) = owner {
                    if !self.graph.contains(id) {
                        return Err(CoreError::NodeNotFound { id }.into());
                    }
                }
                Ok(if self.layout.move_box(owner, to) {
                    DispatchOutcome::applied()
                } else {
                    DispatchOutcome::ignored()
                })
            }
        }
    }

    /// Dot-click removal: clears the link attached to `anchor`.
    fn click_anchor(&mut self, anchor: AnchorRef) -> Result<DispatchOutcome, SessionError> {
        let (node, port) = match (anchor.owner, anchor.port) {
            (BoxRef::Node(id), port) => (id, port),
            (BoxRef::Initial, Port::Output) => match self.graph.source_node() {
                Some(id) => (id, Port::Input),
                None => return Ok(DispatchOutcome::ignored()),
            },
            (BoxRef::Final, Port::Input) => match self.graph.final_node() {
                Some(id) => (id, Port::Output),
                None => return Ok(DispatchOutcome::ignored()),
            },
            _ => return Ok(DispatchOutcome::ignored()),
        };
        let change = self.graph.disconnect(node, port)?;
        Ok(DispatchOutcome {
            applied: change.changed,
            change: Some(change),
            ..Default::default()
        })
    }

    /// Maps a released drag onto a link proposal. Either end may be the one
    /// that was pressed. Returns `None` for pairs that cannot form a link.
    fn resolve_drag(
        &mut self,
        pressed: AnchorRef,
        released: AnchorRef,
    ) -> Option<Result<AppliedChange, LinkRejection>> {
        let (out, inp) = match (pressed.port, released.port) {
            (Port::Output, Port::Input) => (pressed.owner, released.owner),
            (Port::Input, Port::Output) => (released.owner, pressed.owner),
            _ => return None,
        };
        match (out, inp) {
            (BoxRef::Node(from), BoxRef::Node(to)) => {
                Some(self.graph.propose_link(from, LinkTarget::Node(to)))
            }
            (BoxRef::Node(from), BoxRef::Final) => {
                Some(self.graph.propose_link(from, LinkTarget::Final))
            }
            (BoxRef::Initial, BoxRef::Node(to)) => Some(self.graph.connect_source(to)),
            _ => None,
        }
    }

    fn refresh(&mut self) {
        let key = (self.graph.revision(), self.initial_value.to_bits());
        if key != self.evaluated_at {
            self.evaluation = ChainEvaluator::new(&self.graph, self.eval_config.clone())
                .run(self.initial_value);
            if let Some(output) = self.evaluation.output() {
                self.final_output = Some(output);
            }
            self.evaluated_at = key;
        }
        self.frame = self.build_frame();
    }

    fn build_frame(&self) -> Frame {
        let mut connectors = Vec::new();

        for node in self.graph.nodes() {
            let Some(successor) = node.successor() else {
                continue;
            };
            let from = BoxRef::Node(node.id());
            let to = match successor {
                Successor::Node(id) => BoxRef::Node(id),
                Successor::Final => BoxRef::Final,
            };
            if let Some(connector) = self.connector(from, to) {
                connectors.push(connector);
            }
        }
        if let Some(fed) = self.graph.source_node() {
            if let Some(connector) = self.connector(BoxRef::Initial, BoxRef::Node(fed)) {
                connectors.push(connector);
            }
        }

        let drag_preview = self.drag.as_ref().and_then(|drag| {
            let origin = self.layout.locate_anchor(drag.anchor)?;
            let is_terminal = drag.anchor.is_terminal();
            let path = self.router.route(origin, drag.cursor, is_terminal);
            Some(DragPreview {
                anchor: drag.anchor,
                svg: path.to_string(),
                path,
                is_terminal,
            })
        });

        Frame {
            revision: self.graph.revision(),
            connectors,
            drag_preview,
            final_output: self.final_output,
            output_ready: self.evaluation.is_complete(),
            open_dropdown: self.open_dropdown,
        }
    }

    fn connector(&self, from: BoxRef, to: BoxRef) -> Option<Connector> {
        let start = self.layout.locate_anchor(AnchorRef::output(from));
        let end = self.layout.locate_anchor(AnchorRef::input(to));
        let (Some(start), Some(end)) = (start, end) else {
            tracing::debug!(?from, ?to, "anchor not rendered, connector skipped");
            return None;
        };
        let is_terminal = from == BoxRef::Initial || to == BoxRef::Final;
        let path = self.router.route(start, end, is_terminal);
        Some(Connector {
            from,
            to,
            svg: path.to_string(),
            path,
            is_terminal,
        })
    }
}
