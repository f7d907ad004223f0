//! Continuation-scoped context store.
//!
//! A request's context must be retrievable from any code reached while
//! processing that request, including after the handler suspends on I/O and
//! resumes on a shared worker thread. Keying by thread or call stack breaks
//! exactly there, so the store binds the context to the logical task chain
//! via `tokio::task_local!`: the binding follows the request future across
//! every `.await`, and sibling requests each see only their own value.

use std::sync::{Arc, Mutex};

use crate::auth::roles::RoleSet;

tokio::task_local! {
    /// Context of the request currently being processed on this task chain.
    static CURRENT: RequestContext;
}

/// Correlation state for one inbound request.
///
/// `request_id` is assigned exactly once when the context begins and never
/// changes. `trace_id` is stamped once by the trace layer and is read-only
/// afterward. Identity fields are written once by the auth gate.
#[derive(Debug, Clone, Default)]
pub struct ContextData {
    pub request_id: String,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub user_id: Option<String>,
    pub roles: Option<RoleSet>,
}

/// Cheap cloneable handle to the per-request context.
///
/// Clones share the same underlying state; the handle never crosses request
/// boundaries because each request gets a fresh `begin`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    inner: Arc<Mutex<ContextData>>,
}

impl RequestContext {
    /// Create a context for one inbound request.
    pub fn begin(request_id: String) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ContextData {
                request_id,
                ..ContextData::default()
            })),
        }
    }

    /// Run `fut` with this context bound to its whole continuation chain.
    pub async fn scope<F>(self, fut: F) -> F::Output
    where
        F: std::future::Future,
    {
        CURRENT.scope(self, fut).await
    }

    /// Context of the request the calling code is working for, if any.
    ///
    /// Returns `None` outside a request scope (startup, background tasks).
    pub fn current() -> Option<RequestContext> {
        CURRENT.try_with(|ctx| ctx.clone()).ok()
    }

    pub fn request_id(&self) -> String {
        self.lock().request_id.clone()
    }

    pub fn trace_id(&self) -> Option<String> {
        self.lock().trace_id.clone()
    }

    pub fn span_id(&self) -> Option<String> {
        self.lock().span_id.clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.lock().user_id.clone()
    }

    pub fn roles(&self) -> Option<RoleSet> {
        self.lock().roles.clone()
    }

    /// Stamp trace correlation once per hop.
    ///
    /// The trace id is write-once: a value already present (inherited from
    /// the inbound request) is never replaced. The span id is this hop's own
    /// and is always written.
    pub fn stamp_trace(&self, trace_id: String, span_id: String) {
        let mut data = self.lock();
        if data.trace_id.is_none() {
            data.trace_id = Some(trace_id);
        }
        data.span_id = Some(span_id);
    }

    /// Attach the verified identity produced by the auth gate.
    ///
    /// Both fields land in one call so a failed verification can never leave
    /// partial identity behind; roles are read-only from here on.
    pub fn attach_identity(&self, user_id: String, roles: RoleSet) {
        let mut data = self.lock();
        data.user_id = Some(user_id);
        data.roles = Some(roles);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ContextData> {
        // The lock is only ever held for field access, never across awaits.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::Role;

    #[tokio::test]
    async fn current_is_none_outside_scope() {
        assert!(RequestContext::current().is_none());
    }

    #[tokio::test]
    async fn context_visible_across_await_points() {
        let ctx = RequestContext::begin("req-1".into());
        ctx.scope(async {
            tokio::task::yield_now().await;
            let seen = RequestContext::current().expect("context in scope");
            assert_eq!(seen.request_id(), "req-1");
        })
        .await;
    }

    #[tokio::test]
    async fn interleaved_requests_keep_their_own_context() {
        // Two "requests" that repeatedly suspend so the runtime interleaves
        // them; each must only ever observe its own id.
        let run = |id: &'static str| {
            RequestContext::begin(id.into()).scope(async move {
                for _ in 0..32 {
                    tokio::task::yield_now().await;
                    let seen = RequestContext::current().expect("context in scope");
                    assert_eq!(seen.request_id(), id);
                }
            })
        };

        let a = tokio::spawn(run("req-a"));
        let b = tokio::spawn(run("req-b"));
        a.await.expect("task a");
        b.await.expect("task b");
    }

    #[tokio::test]
    async fn trace_id_is_write_once() {
        let ctx = RequestContext::begin("req-1".into());
        ctx.stamp_trace("trace-1".into(), "span-1".into());
        ctx.stamp_trace("trace-2".into(), "span-2".into());
        assert_eq!(ctx.trace_id().as_deref(), Some("trace-1"));
        assert_eq!(ctx.span_id().as_deref(), Some("span-2"));
    }

    #[tokio::test]
    async fn identity_lands_atomically() {
        let ctx = RequestContext::begin("req-1".into());
        assert!(ctx.user_id().is_none());
        assert!(ctx.roles().is_none());

        ctx.attach_identity("user-1".into(), RoleSet::from_iter([Role::Engineer]));
        assert_eq!(ctx.user_id().as_deref(), Some("user-1"));
        assert!(ctx.roles().expect("roles set").contains(Role::Engineer));
    }
}
