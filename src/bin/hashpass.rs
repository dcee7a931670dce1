use refine_server::auth::hash_password;

// Prints an Argon2 PHC string for seeding admin_user.password_hash.
fn main() {
    let password = std::env::args().nth(1).expect("Usage: hashpass <password>");
    match hash_password(&password) {
        Ok(phc) => println!("{phc}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
