//! Prints an argon2id hash for the admin password, to be set as
//! `APP_ADMIN_CONFIG__PASSWORD_HASH` (or `admin_config.password_hash` in a config file).
//!
//! Usage: `hash_admin_password [PASSWORD]`, a random password is generated when none is given.

use newsletter::{utils::b64_encode, web::auth::password::hash_new_to_string};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};

fn main() -> anyhow::Result<()> {
    let password = match std::env::args().nth(1) {
        Some(password) => SecretString::from(password),
        None => {
            let mut buf = [0u8; 32];
            rand::rng().fill_bytes(&mut buf);
            let generated = SecretString::from(b64_encode(buf));
            println!("Generated password:\n\t'{}'", generated.expose_secret());
            generated
        }
    };

    let hashed = hash_new_to_string(password)?;
    println!("Password hash:\n\t'{hashed}'");

    Ok(())
}
