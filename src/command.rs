use std::process::ExitStatus;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Status of a statement that finished successfully.
pub const SUCCESS: ExitCode = 0;

/// Status reported when a built-in or the interpreter itself rejects its input.
pub const USAGE_ERROR: ExitCode = 2;

/// Status of a stage whose program exists but could not be executed.
pub const NOT_EXECUTABLE: ExitCode = 126;

/// Status of a stage whose program could not be located.
pub const COMMAND_NOT_FOUND: ExitCode = 127;

/// Convert a child's termination status into a shell exit code.
///
/// Children killed by a signal report `128 + signal`, the way POSIX shells do.
pub fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => code,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    -1
}
