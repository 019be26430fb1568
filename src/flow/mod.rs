pub mod controller;
pub mod countdown;
pub mod otp_entry;

pub use controller::{
    transition, FlowEvent, FlowState, Notice, NoticeLevel, ResetFlowController, ResetSession,
};
pub use countdown::{Clock, CountdownTimer, SystemClock};
pub use otp_entry::{OtpEntry, OTP_LEN};
