//! Handler group contract.

use serde_json::Value;

/// A cohesive set of remote operations sharing one entry point.
///
/// Groups are built once and then shared read-only between connection
/// threads; all host access goes through the `host` argument, which is only
/// ever handed out on the host thread.
pub trait CommandGroup<H>: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Commands this group accepts.
    fn commands(&self) -> Vec<&'static str>;

    /// Runs `command` against the host.
    ///
    /// Failure is reported in-band: the returned object carries
    /// `"success": false` and an `"error"` message.
    fn handle(&self, host: &mut H, command: &str, params: &Value) -> Value;
}
