//! secrethub CLI - message encryption and password hashing
//!
//! The encryption key is read from the `SECRET` environment variable and
//! handed to the library explicitly; when the variable is absent the user
//! is offered a freshly generated key for the current invocation.

use std::io::{self, BufRead, Write};
use std::process;

use clap::{Parser, Subcommand};
use zeroize::Zeroizing;

use secrethub::input::{PasswordReader, ReaderPasswordReader, TerminalPasswordReader};
use secrethub::{ErrorCategory, ErrorKind, Key, SecretError, SecretFacade};

#[derive(Parser)]
#[command(name = "secrethub")]
#[command(version)]
#[command(about = "Symmetric message encryption and password hashing.", long_about = None)]
struct Cli {
    /// Read passwords from stdin instead of from terminal
    #[arg(long, global = true)]
    password_stdin: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new encryption key
    New,

    /// Encrypt a message under the key in SECRET
    #[command(alias = "e")]
    Encrypt {
        /// Message to encrypt
        message: String,
    },

    /// Decrypt a token produced by encrypt
    #[command(alias = "d")]
    Decrypt {
        /// Ciphertext token to decrypt
        token: String,
    },

    /// Hash a password
    Hash {
        /// Password to hash; prompted for when omitted
        password: Option<String>,
    },

    /// Verify a password against a hash record
    Verify {
        /// Hash record produced by the hash command
        record: String,

        /// Candidate password; prompted for when omitted
        password: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => println!("{}", output),
        Err(e) if e.kind == ErrorKind::VerifyMismatch => {
            println!("false");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> secrethub::Result<String> {
    match cli.command {
        Commands::New => Ok(Key::generate().encode()),
        Commands::Encrypt { message } => bound_facade()?.encrypt(&message),
        Commands::Decrypt { token } => bound_facade()?.decrypt(&token),
        Commands::Hash { password } => {
            let password = resolve_password(password, cli.password_stdin)?;
            bound_facade()?.hash_password(&password)
        }
        Commands::Verify { record, password } => {
            let password = resolve_password(password, cli.password_stdin)?;
            bound_facade()?
                .verify_password(&record, &password)
                .map(|_| "true".to_string())
        }
    }
}

/// Build a facade from the key in the SECRET environment variable,
/// offering to generate one when the variable is absent.
fn bound_facade() -> secrethub::Result<SecretFacade> {
    let key = match std::env::var("SECRET") {
        Ok(encoded) => encoded.parse::<Key>()?,
        Err(_) => bootstrap_key()?,
    };
    Ok(SecretFacade::new(key))
}

/// Interactive fallback for a missing SECRET variable. The generated key
/// is printed on stderr so the user can export it; declining aborts
/// instead of running without a key.
fn bootstrap_key() -> secrethub::Result<Key> {
    eprint!("Environment variable SECRET not set. Generate a new key? [Y/n] ");
    io::stderr().flush().map_err(io_error)?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer).map_err(io_error)?;

    let answer = answer.trim();
    if answer.is_empty() || answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
        let key = Key::generate();
        eprintln!(
            "New key: {} (export it as SECRET to reuse it)",
            key.encode()
        );
        Ok(key)
    } else {
        Err(SecretError::new(
            ErrorCategory::User,
            ErrorKind::InputUnavailable,
            "no key available; set SECRET or accept key generation",
        ))
    }
}

fn resolve_password(
    arg: Option<String>,
    password_stdin: bool,
) -> secrethub::Result<Zeroizing<String>> {
    match arg {
        Some(password) => Ok(Zeroizing::new(password)),
        None => password_reader(password_stdin).read_password(),
    }
}

fn password_reader(use_stdin: bool) -> Box<dyn PasswordReader> {
    if use_stdin {
        Box::new(ReaderPasswordReader::new(Box::new(io::stdin())))
    } else {
        Box::new(TerminalPasswordReader::new())
    }
}

fn io_error(e: io::Error) -> SecretError {
    SecretError::with_source(
        ErrorCategory::Internal,
        ErrorKind::Io,
        format!("terminal interaction failed: {}", e),
        e,
    )
}
