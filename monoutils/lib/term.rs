//! Module containing terminal utilities

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Determines if the process is running in an interactive terminal environment
pub fn is_interactive_terminal() -> bool {
    let stdin_is_tty = unsafe { libc::isatty(libc::STDIN_FILENO) == 1 };
    let stdout_is_tty = unsafe { libc::isatty(libc::STDOUT_FILENO) == 1 };
    stdin_is_tty && stdout_is_tty
}

/// Determines if styled (ANSI) output should be written to stdout.
///
/// Colors are turned off when `NO_COLOR` is set, when `TERM` is `dumb`, or when stdout is
/// not a terminal.
pub fn is_ansi_interactive_terminal() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var("TERM").is_ok_and(|term| term == "dumb") {
        tracing::debug!("TERM is dumb, disabling styled output");
        return false;
    }

    is_interactive_terminal()
}
