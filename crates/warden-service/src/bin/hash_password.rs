use warden_service::auth::password::hash_password;

fn main() {
    let password = std::env::args().nth(1).unwrap_or_default();

    if let Some(hash) = hash_password(Some(&password)) {
        println!("{hash}");
    } else {
        eprintln!("A non-blank password is required");
        std::process::exit(1);
    }
}
