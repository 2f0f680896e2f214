/// Fetch cycle state for a single crawl request
///
/// A fetch cycle probes the request URL with HEAD, and either stops at a
/// redirect or re-issues the navigation as a GET. The cycle object is also the
/// network interceptor handed to the browser for both navigations, so all
/// per-request state lives here and nowhere else.
use super::CrawlRequest;
use crate::browser::{
    InterceptDecision, NetworkInterceptor, RawRequest, RawResponse, RequestOverrides,
};
use crate::{Result, SileneError};
use std::collections::HashMap;
use std::fmt;

/// Method used for the probe navigation
pub const PROBE_METHOD: &str = "HEAD";

/// Phase of a fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchPhase {
    /// No navigation issued yet
    Idle,

    /// HEAD navigation in flight
    Probing,

    /// The probe completed without a redirect
    ProbeSucceeded,

    /// GET navigation in flight
    Fetching,

    // ===== Terminal =====
    /// The probe was redirected; the GET is never issued
    Redirected,

    /// The GET response is available
    Completed,
}

impl FetchPhase {
    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: FetchPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Probing)
                | (Self::Probing, Self::Redirected)
                | (Self::Probing, Self::ProbeSucceeded)
                | (Self::ProbeSucceeded, Self::Fetching)
                | (Self::Fetching, Self::Completed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Probing => "probing",
            Self::Redirected => "redirected",
            Self::ProbeSucceeded => "probe_succeeded",
            Self::Fetching => "fetching",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-request context of the two-phase fetch protocol
#[derive(Debug)]
pub struct FetchCycle {
    phase: FetchPhase,

    /// Extra headers of the crawl request, applied over the browser's own
    headers: HashMap<String, String>,
    redirect_observed: bool,
    last_request: Option<RawRequest>,
    last_response: Option<RawResponse>,
}

impl FetchCycle {
    pub fn new(request: &CrawlRequest) -> Self {
        Self {
            phase: FetchPhase::Idle,
            headers: request.headers().clone(),
            redirect_observed: false,
            last_request: None,
            last_response: None,
        }
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    /// Moves the cycle to `next`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The transition is legal
    /// * `Err(SileneError::InvalidTransition)` - `next` cannot follow the current phase
    pub fn transition(&mut self, next: FetchPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(SileneError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::debug!("Fetch phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// True once the probe's redirect continuation was aborted
    pub fn redirect_observed(&self) -> bool {
        self.redirect_observed
    }

    pub fn last_request(&self) -> Option<&RawRequest> {
        self.last_request.as_ref()
    }

    pub fn last_response(&self) -> Option<&RawResponse> {
        self.last_response.as_ref()
    }

    fn merged_headers(&self, request: &RawRequest) -> Option<HashMap<String, String>> {
        if self.headers.is_empty() {
            return None;
        }

        let mut headers = request.headers.clone();
        headers.extend(self.headers.clone());
        Some(headers)
    }
}

impl NetworkInterceptor for FetchCycle {
    fn on_request(&mut self, request: &RawRequest) -> InterceptDecision {
        tracing::trace!("Intercepted {} {} in {}", request.method, request.url, self.phase);
        self.last_request = Some(request.clone());

        match self.phase {
            FetchPhase::Probing if request.is_redirect_continuation() => {
                self.redirect_observed = true;
                InterceptDecision::Abort
            }
            FetchPhase::Probing => InterceptDecision::Continue(RequestOverrides {
                method: Some(PROBE_METHOD.to_string()),
                headers: self.merged_headers(request),
            }),
            FetchPhase::Fetching => InterceptDecision::Continue(RequestOverrides {
                method: None,
                headers: self.merged_headers(request),
            }),
            _ => InterceptDecision::Continue(RequestOverrides::default()),
        }
    }

    fn on_response(&mut self, response: &RawResponse) {
        tracing::trace!("Observed {} from {}", response.status, response.url);
        self.last_response = Some(response.clone());
    }
}
