//! Adaptive-crypto demo: encrypt, decrypt, or inspect files through the
//! profiled pipeline. A demonstration, not a stable CLI contract.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mango::config::Storage;
use mango::{CryptoLib, CryptoLibOptions, Header, SALT_LEN};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Demo salt. Real deployments provision their own per-corpus salt.
const DEMO_SALT: [u8; SALT_LEN] = [
    0x1A, 0x2B, 0x3C, 0x4D, 0x5E, 0x6F, 0x70, 0x81, 0x92, 0xA3, 0xB4, 0xC5,
];

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mango=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn usage() -> ! {
    eprintln!("mango_ac v{VERSION} — adaptive cipher demo");
    eprintln!("Usage:");
    eprintln!("  mango_ac encrypt <password> <input> [output]");
    eprintln!("  mango_ac decrypt <password> <input> [output]");
    eprintln!("  mango_ac inspect <input>");
    std::process::exit(2);
}

fn main() -> Result<()> {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = args.first().map(String::as_str).unwrap_or_else(|| usage());

    let storage = Storage::new()?;
    storage.install_catalog()?;

    match mode {
        "inspect" => {
            let input = args.get(1).unwrap_or_else(|| usage());
            let ciphertext = std::fs::read(input)
                .with_context(|| format!("Failed to read {input}"))?;
            let (header, header_len) = Header::parse(&ciphertext)?;
            println!("{}", header.describe());
            println!(
                "header {} bytes, payload {} bytes",
                header_len,
                ciphertext.len() - header_len
            );
            Ok(())
        }
        "encrypt" | "decrypt" => {
            if args.len() < 3 {
                usage();
            }
            let (password, input) = (&args[1], &args[2]);
            let lib = CryptoLib::new(password, CryptoLibOptions::new(DEMO_SALT))?;
            let data = std::fs::read(input)
                .with_context(|| format!("Failed to read {input}"))?;

            let (out, default_ext) = if mode == "encrypt" {
                (lib.encrypt(&data)?, "mng")
            } else {
                (lib.decrypt(&data)?, "out")
            };

            let output = match args.get(3) {
                Some(path) => PathBuf::from(path),
                None => {
                    let name = PathBuf::from(input)
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "mango".to_string());
                    storage.output_dir().join(format!("{name}.{default_ext}"))
                }
            };
            std::fs::write(&output, &out)
                .with_context(|| format!("Failed to write {:?}", output))?;
            tracing::info!("{} {} -> {:?} ({} bytes)", mode, input, output, out.len());
            Ok(())
        }
        _ => bail!("unknown mode '{mode}' (expected encrypt, decrypt, or inspect)"),
    }
}
