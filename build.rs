use std::process::Command;

fn main() {
    // diesel_migrations embeds everything under migrations/ at compile time.
    println!("cargo:rerun-if-changed=migrations/");

    // Stamp the binary with the current git hash for the startup banner.
    let describe = Command::new("git").args(["describe", "--always", "--dirty"]).output();
    let git_hash = match describe {
        Ok(o) => String::from_utf8_lossy(&o.stdout).trim().to_string(),
        Err(_) => "unknown".to_string(),
    };
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rustc-env=BUILD_TIME_GIT_HASH={git_hash}");
}
