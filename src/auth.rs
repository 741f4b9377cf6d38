use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

const PASSWORD_ENV: &str = "PWCRYPT_PASSWORD";

fn password_from_env() -> Option<Zeroizing<String>> {
    //  PWCRYPT_PASSWORD="supersecret" pwcrypt verify <HASH>
    // an empty variable counts as unset, like clap's env fallbacks
    match std::env::var(PASSWORD_ENV) {
        Ok(pw) if !pw.is_empty() => Some(Zeroizing::new(pw)),
        _ => None,
    }
}

/// Reads one line from piped stdin. An empty line is the empty password;
/// `None` means stdin was closed before any line arrived.
fn password_from_pipe() -> Result<Option<Zeroizing<String>>> {
    let mut buf = Zeroizing::new(String::new());
    if io::stdin().lock().read_line(&mut buf)? == 0 {
        return Ok(None);
    }

    trim_newline(&mut buf);
    Ok(Some(buf))
}

/// Reads the password to check against a stored hash.
pub fn read_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    //  stdin (Pipeline)
    //  echo "supersecret" | pwcrypt verify <HASH>
    if !io::stdin().is_terminal() {
        return match password_from_pipe()? {
            Some(pw) => Ok(pw),
            None => bail!("No password provided"),
        };
    }

    //  Interactive (TTY)
    Ok(Zeroizing::new(rpassword::prompt_password("Password: ")?))
}

/// Reads a password to hash, asking twice when a terminal is attached.
///
/// The empty password is accepted.
pub fn read_new_password_with_confirmation() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    if !io::stdin().is_terminal() {
        return match password_from_pipe()? {
            Some(pw) => Ok(pw),
            None => bail!("No password provided"),
        };
    }

    let pw1 = Zeroizing::new(rpassword::prompt_password("New password: ")?);
    let pw2 = Zeroizing::new(rpassword::prompt_password("Confirm password: ")?);

    if pw1 != pw2 {
        bail!("passwords do not match");
    }

    Ok(pw1)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
