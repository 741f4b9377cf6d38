use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pwcrypt::{AesCrypter, Crypter, Hasher, Pbkdf2Hasher};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
mod auth;

#[derive(Debug, clap::Args)]
struct CrypterArgs {
    /// Passphrase the cipher key is derived from
    #[arg(long, env = "PWCRYPT_KEY", hide_env_values = true)]
    key: String,

    /// Comma separated salt bytes for key derivation, e.g. 1,3,5,9
    #[arg(long, env = "PWCRYPT_IV_SEED", value_delimiter = ',', required = true)]
    iv_seed: Vec<u8>,
}

impl CrypterArgs {
    fn to_crypter(&self) -> Result<AesCrypter> {
        AesCrypter::new(&self.key, &self.iv_seed).context("failed to set up the crypter")
    }
}

#[derive(Debug, Parser)]
#[command(name = "pwcrypt")]
#[command(
    version,
    about = "Encrypt text and hash passwords into storable base64 blobs."
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts text into a base64 blob
    #[command(arg_required_else_help = true)]
    Encrypt {
        text: String,
        #[command(flatten)]
        crypter: CrypterArgs,
    },

    /// Decrypts a base64 blob back into text
    #[command(arg_required_else_help = true)]
    Decrypt {
        blob: String,
        #[command(flatten)]
        crypter: CrypterArgs,
    },

    /// Hashes a password read from PWCRYPT_PASSWORD, stdin or a prompt
    Hash,

    /// Checks a password against a stored hash
    #[command(arg_required_else_help = true)]
    Verify { hash: String },

    /// Walks through encryption and hashing with sample values
    Demo,
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("pwcrypt={level}").parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn run_demo() -> Result<()> {
    println!("-------------");
    println!("CRYPTERS demo");
    println!("-------------");

    let key = "someKey";
    let iv_seed = [1u8, 3, 5, 9, 1, 4, 5, 6];
    let crypter = AesCrypter::new(key, &iv_seed)?;
    println!("Key: {key}");
    println!("IV seed: {iv_seed:?}");

    let plain_text = "A happy little tree";
    let cipher_text = crypter.encrypt(plain_text)?;
    println!("Plain text: {plain_text}");
    println!("Encrypted text: {cipher_text}");
    println!("Decrypted text: {}", crypter.decrypt(&cipher_text)?);
    crypter.close();

    println!();
    println!("-------------");
    println!("HASHERS demo");
    println!("-------------");

    let hasher = Pbkdf2Hasher::new();
    let password_text = "Sup3rSaF3Passw0rd";
    let password_hash = hasher.hash_password(password_text)?;
    println!("Password text: {password_text}");
    println!("Password hash: {password_hash}");
    println!(
        "The same password matches: {}",
        hasher.compare_password_to_hash(password_text, &password_hash)?
    );
    println!(
        "A different password matches: {}",
        hasher.compare_password_to_hash("AnotherPasswordText", &password_hash)?
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_logging(args.verbose)?;

    match args.command {
        Commands::Encrypt { text, crypter } => {
            let blob = crypter.to_crypter()?.encrypt_async(&text).await?;
            println!("{blob}");
        }
        Commands::Decrypt { blob, crypter } => {
            let text = crypter.to_crypter()?.decrypt_async(&blob).await?;
            println!("{text}");
        }
        Commands::Hash => {
            let password = auth::read_new_password_with_confirmation()?;
            let hash = Pbkdf2Hasher::new().hash_password_async(&password).await?;
            println!("{hash}");
        }
        Commands::Verify { hash } => {
            let password = auth::read_password()?;
            let matches = Pbkdf2Hasher::new()
                .compare_password_to_hash_async(&password, &hash)
                .await?;
            if matches {
                println!("password matches");
            } else {
                println!("password does not match");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Demo => run_demo()?,
    }

    Ok(ExitCode::SUCCESS)
}
