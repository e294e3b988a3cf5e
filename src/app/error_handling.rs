//! Error handling utilities

use tracing::error;

use crate::error::EsgError;

/// Handle fatal errors and exit with appropriate status code
///
/// `EsgError`s print their user message, plus the full cause chain when
/// `verbose >= 1`, and exit with their own code. Anything else exits with 1.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    let exit_code = if let Some(esg_err) = error.downcast_ref::<EsgError>() {
        eprintln!("{}", esg_err.user_message());

        if verbose >= 1 {
            eprintln!("\nContext Chain:\n{}", esg_err.developer_message());
        }

        esg_err.exit_code()
    } else {
        eprintln!("Error: {error}");

        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {}: {}", i, cause);
            }
        }

        1
    };

    std::process::exit(exit_code)
}
