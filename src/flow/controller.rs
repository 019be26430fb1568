use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use validator::Validate;

use crate::config::DEFAULT_OTP_TTL_SECS;
use crate::flow::countdown::{Clock, CountdownTimer, SystemClock};
use crate::flow::otp_entry::OtpEntry;
use crate::models::auth::{ForgotPasswordRequest, ResetPasswordRequest};
use crate::services::verification::VerificationService;

/// The step currently shown to the user. Exactly one is active; the
/// "expired" OTP view is derived from the countdown timer, not stored
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    LoggingIn,
    AwaitingEmail,
    AwaitingOtp,
    AwaitingNewPassword,
}

/// Transition triggers: user actions and resolved remote outcomes.
/// Remote failures are not events; a failed call leaves the state
/// where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    ForgotPassword,
    OtpRequested,
    OtpVerified,
    PasswordReset,
    Back,
}

/// Pure transition table. Events that don't apply to the current state
/// leave it unchanged, so the machine can be exercised without any UI
/// or network attached.
pub fn transition(state: FlowState, event: &FlowEvent) -> FlowState {
    use FlowEvent::*;
    use FlowState::*;

    match (state, event) {
        (LoggingIn, ForgotPassword) => AwaitingEmail,
        (AwaitingEmail, OtpRequested) => AwaitingOtp,
        (AwaitingEmail, Back) => LoggingIn,
        (AwaitingOtp, OtpVerified) => AwaitingNewPassword,
        (AwaitingOtp, Back) => AwaitingEmail,
        (AwaitingNewPassword, PasswordReset) => LoggingIn,
        (other, _) => other,
    }
}

/// Transient data for one pass through the reset flow. Lives only in
/// memory and is cleared on every return to `LoggingIn`.
#[derive(Debug, Clone, Default)]
pub struct ResetSession {
    pub email: String,
    pub otp_deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Toast/banner message surfaced to the user. Consumed once.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Owns the flow state, the session, the countdown and the OTP entry,
/// and mediates every transition. Remote calls go through the injected
/// `VerificationService`; failures surface as notices and never advance
/// the state. The exclusive borrow on every method keeps at most one
/// remote call in flight per controller, and `busy` mirrors that for
/// the view so it can disable the triggering control.
pub struct ResetFlowController {
    state: FlowState,
    session: ResetSession,
    timer: CountdownTimer,
    otp: OtpEntry,
    busy: bool,
    notice: Option<Notice>,
    otp_ttl_secs: u64,
    service: Arc<dyn VerificationService>,
    clock: Arc<dyn Clock>,
}

impl ResetFlowController {
    pub fn new(service: Arc<dyn VerificationService>) -> Self {
        Self::with_clock(service, Arc::new(SystemClock), DEFAULT_OTP_TTL_SECS)
    }

    pub fn with_clock(
        service: Arc<dyn VerificationService>,
        clock: Arc<dyn Clock>,
        otp_ttl_secs: u64,
    ) -> Self {
        Self {
            state: FlowState::LoggingIn,
            session: ResetSession::default(),
            timer: CountdownTimer::new(),
            otp: OtpEntry::new(),
            busy: false,
            notice: None,
            otp_ttl_secs,
            service,
            clock,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn session(&self) -> &ResetSession {
        &self.session
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn otp_entry(&self) -> &OtpEntry {
        &self.otp
    }

    pub fn otp_entry_mut(&mut self) -> &mut OtpEntry {
        &mut self.otp
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The pending notice, if any. Reading it clears it.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Expired sub-state of `AwaitingOtp`, derived from the timer.
    pub fn otp_expired(&self) -> bool {
        self.state == FlowState::AwaitingOtp && self.timer.is_expired()
    }

    /// Verify is available only with a complete code inside the window.
    pub fn can_verify(&self) -> bool {
        self.state == FlowState::AwaitingOtp
            && self.otp.is_complete()
            && !self.timer.is_expired()
            && !self.busy
    }

    /// "Forgot Password" on the login screen.
    pub fn forgot_password(&mut self) {
        self.apply(FlowEvent::ForgotPassword);
    }

    /// "Back" from the email or OTP step. Leaving the OTP step keeps
    /// the email so the form comes back prefilled; returning to the
    /// login screen clears the whole session.
    pub fn back(&mut self) {
        if self.state == FlowState::AwaitingOtp {
            self.timer.stop();
            self.otp.reset();
        }
        self.apply(FlowEvent::Back);
        if self.state == FlowState::LoggingIn {
            self.clear_session();
        }
    }

    /// One second of wall clock while the OTP step is showing.
    pub fn tick(&mut self) {
        if self.state == FlowState::AwaitingOtp {
            self.timer.tick();
        }
    }

    /// Email form submission: validate locally, then request an OTP.
    pub async fn submit_email(&mut self, email: &str) {
        if self.state != FlowState::AwaitingEmail || self.busy {
            return;
        }

        let request = ForgotPasswordRequest {
            email: email.trim().to_string(),
        };
        if request.validate().is_err() {
            self.notice = Some(Notice::error("Please enter a valid email address"));
            return;
        }

        self.busy = true;
        let outcome = self.service.request_otp(&request.email).await;
        self.busy = false;

        match outcome {
            Ok(response) if response.success => {
                self.session.email = request.email;
                self.session.otp_deadline =
                    Some(self.clock.now() + Duration::seconds(self.otp_ttl_secs as i64));
                self.timer.start(self.otp_ttl_secs);
                self.otp.reset();
                self.apply(FlowEvent::OtpRequested);
                self.notice = Some(Notice::info(
                    response.message_or("OTP sent to your email").to_string(),
                ));
                tracing::info!(email = %self.session.email, "OTP requested");
            }
            Ok(response) => {
                self.notice = Some(Notice::error(
                    response.message_or("Failed to send OTP").to_string(),
                ));
            }
            Err(err) => {
                tracing::error!("request-OTP failed: {}", err);
                self.notice = Some(Notice::error("Failed to send OTP"));
            }
        }
    }

    /// "Resend OTP", available on the OTP step (expired or not).
    pub async fn resend_otp(&mut self) {
        if self.state != FlowState::AwaitingOtp || self.busy {
            return;
        }

        self.busy = true;
        let outcome = self.service.request_otp(&self.session.email).await;
        self.busy = false;

        match outcome {
            Ok(response) if response.success => {
                self.session.otp_deadline =
                    Some(self.clock.now() + Duration::seconds(self.otp_ttl_secs as i64));
                self.timer.start(self.otp_ttl_secs);
                self.otp.reset();
                self.notice = Some(Notice::info(
                    response.message_or("A new OTP is on its way").to_string(),
                ));
                tracing::info!(email = %self.session.email, "OTP resent");
            }
            Ok(response) => {
                self.notice = Some(Notice::error(
                    response.message_or("Failed to send OTP").to_string(),
                ));
            }
            Err(err) => {
                tracing::error!("resend-OTP failed: {}", err);
                self.notice = Some(Notice::error("Failed to send OTP"));
            }
        }
    }

    /// Verify the composed code. Never called with an incomplete entry
    /// or after expiry; both are also re-checked here since the view's
    /// disabled state is advisory.
    pub async fn submit_otp(&mut self) {
        if !self.can_verify() {
            return;
        }
        let code = match self.otp.code() {
            Some(code) => code,
            None => return,
        };

        self.busy = true;
        let outcome = self.service.verify_otp(&self.session.email, &code).await;
        self.busy = false;

        // The OTP window keeps closing while the call is in flight. If
        // the deadline passed in the meantime, expiry wins and a late
        // success is discarded; the user has to resend.
        let deadline_passed = self
            .session
            .otp_deadline
            .map(|deadline| self.clock.now() >= deadline)
            .unwrap_or(false);
        if self.timer.is_expired() || deadline_passed {
            self.timer.expire();
            self.notice = Some(Notice::error("OTP expired, please request a new one"));
            return;
        }

        match outcome {
            Ok(response) if response.success => {
                self.timer.stop();
                self.apply(FlowEvent::OtpVerified);
            }
            Ok(response) => {
                // Entry is left as-is so the user can correct it.
                self.notice = Some(Notice::error(
                    response.message_or("Failed to verify OTP").to_string(),
                ));
            }
            Err(err) => {
                tracing::error!("verify-OTP failed: {}", err);
                self.notice = Some(Notice::error("Failed to verify OTP"));
            }
        }
    }

    /// New password form submission. The guard is local (match + length);
    /// the remote reset-password call is the planned integration point
    /// and is fired best-effort, without blocking the transition.
    pub async fn submit_new_password(&mut self, new_password: &str, confirm: &str) {
        if self.state != FlowState::AwaitingNewPassword || self.busy {
            return;
        }
        if new_password != confirm {
            self.notice = Some(Notice::error("Passwords do not match"));
            return;
        }
        let request = ResetPasswordRequest {
            email: self.session.email.clone(),
            new_password: new_password.to_string(),
        };
        if request.validate().is_err() {
            self.notice = Some(Notice::error("Password must be at least 8 characters"));
            return;
        }

        self.busy = true;
        let outcome = self
            .service
            .reset_password(&request.email, &request.new_password)
            .await;
        self.busy = false;

        if let Err(err) = outcome {
            tracing::warn!("reset-password call failed: {}", err);
        }

        self.apply(FlowEvent::PasswordReset);
        self.clear_session();
        self.notice = Some(Notice::info("Password reset successful"));
    }

    fn apply(&mut self, event: FlowEvent) {
        let next = transition(self.state, &event);
        if next != self.state {
            tracing::debug!(from = ?self.state, ?event, to = ?next, "flow transition");
            self.state = next;
        }
    }

    fn clear_session(&mut self) {
        self.session = ResetSession::default();
        self.timer.stop();
        self.otp.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_happy_path() {
        let mut state = FlowState::LoggingIn;
        for (event, expected) in [
            (FlowEvent::ForgotPassword, FlowState::AwaitingEmail),
            (FlowEvent::OtpRequested, FlowState::AwaitingOtp),
            (FlowEvent::OtpVerified, FlowState::AwaitingNewPassword),
            (FlowEvent::PasswordReset, FlowState::LoggingIn),
        ] {
            state = transition(state, &event);
            assert_eq!(state, expected);
        }
    }

    #[test]
    fn transition_back_steps() {
        assert_eq!(
            transition(FlowState::AwaitingEmail, &FlowEvent::Back),
            FlowState::LoggingIn
        );
        assert_eq!(
            transition(FlowState::AwaitingOtp, &FlowEvent::Back),
            FlowState::AwaitingEmail
        );
    }

    #[test]
    fn inapplicable_events_leave_state_unchanged() {
        assert_eq!(
            transition(FlowState::LoggingIn, &FlowEvent::OtpVerified),
            FlowState::LoggingIn
        );
        assert_eq!(
            transition(FlowState::AwaitingOtp, &FlowEvent::ForgotPassword),
            FlowState::AwaitingOtp
        );
        assert_eq!(
            transition(FlowState::AwaitingNewPassword, &FlowEvent::Back),
            FlowState::AwaitingNewPassword
        );
    }
}
