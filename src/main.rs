//! Host-side helper: `cargo run` builds the wasm bundle into `static/pkg` and
//! serves `static/` locally. Log output follows `RUST_LOG`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = host::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod host {
    use std::env;
    use std::io;
    use std::process::{Command, Stdio};

    const DEFAULT_PORT: u16 = 8000;

    pub fn run() -> io::Result<()> {
        build_bundle()?;

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        log::info!("serving static/ at http://127.0.0.1:{port}");
        let mut server = Command::new("python3")
            .args(["-m", "http.server", &port.to_string(), "--directory", "static"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let status = server.wait()?;
        if !status.success() {
            return Err(io::Error::other(format!("http server exited with {status}")));
        }
        Ok(())
    }

    fn build_bundle() -> io::Result<()> {
        log::info!("building wasm bundle into static/pkg");
        match Command::new("wasm-pack")
            .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
            .status()
        {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(io::Error::other(format!("wasm-pack failed with {status}"))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::warn!("wasm-pack not found in PATH; serving whatever static/pkg holds");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
