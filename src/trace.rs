//! # Trace Scopes
//!
//! A `TraceContext` is an immutable set of diagnostic flags. Instead of a
//! process-wide stack, the current context is handed down every recursive
//! layout call; entering a node combines the caller's context with the
//! node's own with a sticky OR, so a flag switched on by an ancestor stays
//! on for the whole subtree.

use crate::design::DesignElement;
use crate::error::DesignError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    /// Tracking id of the node that enabled the most recent flags.
    pub owner_id: Option<String>,
    pub trace_layout: bool,
    pub trace_text: bool,
    pub trace_path: bool,
    pub trace_outline: bool,
}

impl TraceContext {
    pub const fn off() -> Self {
        Self {
            owner_id: None,
            trace_layout: false,
            trace_text: false,
            trace_path: false,
            trace_outline: false,
        }
    }

    /// Parse a `trace="layout,text"` attribute.
    pub fn from_element(el: &DesignElement) -> Result<Option<Self>, DesignError> {
        let Some(raw) = el.get("trace") else {
            return Ok(None);
        };
        let mut ctx = TraceContext {
            owner_id: el.get("trackingId").or_else(|| el.get("id")).map(str::to_string),
            ..TraceContext::off()
        };
        for flag in raw.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match flag {
                "layout" => ctx.trace_layout = true,
                "text" => ctx.trace_text = true,
                "path" => ctx.trace_path = true,
                "outline" => ctx.trace_outline = true,
                "all" => {
                    ctx.trace_layout = true;
                    ctx.trace_text = true;
                    ctx.trace_path = true;
                    ctx.trace_outline = true;
                }
                other => return Err(el.error(format!("unknown trace flag '{}'", other))),
            }
        }
        Ok(Some(ctx))
    }

    /// Enter a narrower scope. Flags only ever turn on.
    pub fn push(&self, inner: Option<&TraceContext>) -> TraceContext {
        match inner {
            None => self.clone(),
            Some(inner) => TraceContext {
                owner_id: inner.owner_id.clone().or_else(|| self.owner_id.clone()),
                trace_layout: self.trace_layout || inner.trace_layout,
                trace_text: self.trace_text || inner.trace_text,
                trace_path: self.trace_path || inner.trace_path,
                trace_outline: self.trace_outline || inner.trace_outline,
            },
        }
    }

    pub fn owner(&self) -> &str {
        self.owner_id.as_deref().unwrap_or("-")
    }
}
