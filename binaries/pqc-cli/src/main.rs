//! PQC Classroom CLI
//!
//! Command-line front end for the toy-kernel: classical ciphers, toy RSA,
//! the lattice sandbox and a Kyber KEM storyboard.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use pqc_config::{ClassroomConfig, OutputFormat};
use pqc_core::rsa::{self, ToyRsaKeypair};
use pqc_core::{classical, Basis, ClosestPoint, Vec2};
use pqc_visual::{LatticeRenderer, LatticeScene};

#[derive(Parser, Debug)]
#[command(name = "pqc")]
#[command(about = "PQC Classroom - toy cryptography from Caesar to lattices")]
#[command(version)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Config file (default: ~/.config/pqc-classroom/config.yaml)
    #[arg(long = "config", global = true, value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Caesar shift cipher
    Caesar {
        #[command(subcommand)]
        command: CaesarCommands,
    },

    /// Vigenère polyalphabetic cipher
    Vigenere {
        #[command(subcommand)]
        command: VigenereCommands,
    },

    /// Toy RSA with primes below 200
    Rsa {
        #[command(subcommand)]
        command: RsaCommands,
    },

    /// Lattice sandbox - closest vector search and SVG drawing
    Lattice {
        #[command(subcommand)]
        command: LatticeCommands,
    },

    /// CRYSTALS-Kyber key encapsulation, told as a four-step storyboard
    Kyber,

    /// Show the effective configuration
    Config,
}

#[derive(Subcommand, Debug)]
enum CaesarCommands {
    /// Shift every letter forward
    Encrypt {
        /// Shift amount (any integer, reduced mod 26)
        #[arg(short, long, allow_negative_numbers = true)]
        shift: i64,

        /// Text to encrypt
        text: String,
    },

    /// Shift every letter back
    Decrypt {
        /// Shift amount (any integer, reduced mod 26)
        #[arg(short, long, allow_negative_numbers = true)]
        shift: i64,

        /// Text to decrypt
        text: String,
    },

    /// Try all 26 shifts
    Bruteforce {
        /// Ciphertext
        text: String,
    },
}

#[derive(Subcommand, Debug)]
enum VigenereCommands {
    /// Encrypt with a repeating key
    Encrypt {
        /// Key letters (non-letters are ignored; empty means no change)
        #[arg(short, long)]
        key: String,

        /// Text to encrypt
        text: String,
    },

    /// Decrypt with a repeating key
    Decrypt {
        /// Key letters (non-letters are ignored; empty means no change)
        #[arg(short, long)]
        key: String,

        /// Text to decrypt
        text: String,
    },
}

#[derive(Subcommand, Debug)]
enum RsaCommands {
    /// Generate a toy keypair
    Keygen {
        /// Seed for a reproducible keypair
        #[arg(long)]
        seed: Option<u64>,
    },

    /// c = m^e mod n
    Encrypt {
        /// Public exponent e
        #[arg(short = 'e', long = "exponent")]
        e: u64,

        /// Modulus n
        #[arg(short = 'n', long = "modulus")]
        n: u64,

        /// Message as a small integer
        #[arg(allow_negative_numbers = true)]
        message: i64,
    },

    /// m = c^d mod n
    Decrypt {
        /// Private exponent d
        #[arg(short = 'd', long = "private")]
        d: u64,

        /// Modulus n
        #[arg(short = 'n', long = "modulus")]
        n: u64,

        /// Ciphertext as an integer
        #[arg(allow_negative_numbers = true)]
        ciphertext: i64,
    },

    /// Generate a keypair, then encrypt and decrypt a message with it
    Demo {
        /// Seed for a reproducible keypair
        #[arg(long)]
        seed: Option<u64>,

        /// Message as a small integer (keep 0 <= m < n)
        #[arg(short, long, default_value_t = 42, allow_negative_numbers = true)]
        message: i64,
    },
}

#[derive(Subcommand, Debug)]
enum LatticeCommands {
    /// Closest lattice point to a target, i, j in [-5, 5]
    Closest {
        /// Basis as "x1,y1;x2,y2" (default from config)
        #[arg(long, allow_hyphen_values = true)]
        basis: Option<Basis>,

        /// Target as "x,y" (default from config)
        #[arg(long, allow_hyphen_values = true)]
        target: Option<Vec2>,
    },

    /// Draw the lattice, target and closest point as SVG
    Render {
        /// Basis as "x1,y1;x2,y2" (default from config)
        #[arg(long, allow_hyphen_values = true)]
        basis: Option<Basis>,

        /// Target as "x,y" (default from config)
        #[arg(long, allow_hyphen_values = true)]
        target: Option<Vec2>,

        /// Output SVG file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ClassroomConfig::load(cli.config_file.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&config, cli.verbose);

    let out = Printer {
        format: if cli.json { OutputFormat::Json } else { config.output },
    };

    match cli.command {
        Commands::Caesar { command } => cmd_caesar(command, &out),
        Commands::Vigenere { command } => cmd_vigenere(command, &out),
        Commands::Rsa { command } => cmd_rsa(command, &out),
        Commands::Lattice { command } => cmd_lattice(command, &config, &out),
        Commands::Kyber => cmd_kyber(&out),
        Commands::Config => cmd_config(&config, &out),
    }
}

fn init_tracing(config: &ClassroomConfig, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints either the text rendering or the JSON form of a result
struct Printer {
    format: OutputFormat,
}

impl Printer {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => println!("{}", text(value)),
        }
        Ok(())
    }
}

/// Direction of a cipher or RSA operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Mode {
    Encrypt,
    Decrypt,
}

impl Mode {
    fn title(self) -> &'static str {
        match self {
            Mode::Encrypt => "ENCRYPT",
            Mode::Decrypt => "DECRYPT",
        }
    }
}

// ═══════════════════════════════════════════════════════════
// CLASSICAL
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct CipherOutput {
    cipher: &'static str,
    mode: Mode,
    key: String,
    input: String,
    output: String,
    /// The inverse operation applied to `output`
    check: String,
}

impl CipherOutput {
    fn render(&self) -> String {
        format!(
            "\n  {} ({})\n  Key:    {}\n  Input:  {}\n  Output: {}\n  Check:  {}",
            self.mode.title(),
            self.cipher.to_uppercase(),
            self.key,
            self.input,
            self.output,
            self.check,
        )
    }
}

fn caesar_output(mode: Mode, shift: i64, text: String) -> CipherOutput {
    let (output, check) = match mode {
        Mode::Encrypt => {
            let c = classical::caesar_encrypt(&text, shift);
            let check = classical::caesar_decrypt(&c, shift);
            (c, check)
        }
        Mode::Decrypt => {
            let p = classical::caesar_decrypt(&text, shift);
            let check = classical::caesar_encrypt(&p, shift);
            (p, check)
        }
    };

    CipherOutput {
        cipher: "caesar",
        mode,
        key: format!("{} (effective {})", shift, classical::normalize_shift(shift)),
        input: text,
        output,
        check,
    }
}

fn vigenere_output(mode: Mode, key: String, text: String) -> CipherOutput {
    if classical::normalize(&key).is_empty() {
        tracing::warn!(key = %key, "key has no letters, text passes through unchanged");
    }

    let (output, check) = match mode {
        Mode::Encrypt => {
            let c = classical::vigenere_encrypt(&text, &key);
            let check = classical::vigenere_decrypt(&c, &key);
            (c, check)
        }
        Mode::Decrypt => {
            let p = classical::vigenere_decrypt(&text, &key);
            let check = classical::vigenere_encrypt(&p, &key);
            (p, check)
        }
    };

    CipherOutput {
        cipher: "vigenere",
        mode,
        key,
        input: text,
        output,
        check,
    }
}

fn cmd_caesar(command: CaesarCommands, out: &Printer) -> Result<()> {
    match command {
        CaesarCommands::Encrypt { shift, text } => {
            out.emit(&caesar_output(Mode::Encrypt, shift, text), CipherOutput::render)
        }
        CaesarCommands::Decrypt { shift, text } => {
            out.emit(&caesar_output(Mode::Decrypt, shift, text), CipherOutput::render)
        }
        CaesarCommands::Bruteforce { text } => {
            let candidates = classical::caesar_bruteforce(&text);
            out.emit(&candidates, |candidates| {
                let mut s = format!("\n  CAESAR BRUTEFORCE\n  ==================\n\n  Ciphertext: {}\n", text);
                for (shift, plain) in candidates {
                    s.push_str(&format!("\n  [{:2}] {}", shift, plain));
                }
                s
            })
        }
    }
}

fn cmd_vigenere(command: VigenereCommands, out: &Printer) -> Result<()> {
    match command {
        VigenereCommands::Encrypt { key, text } => {
            out.emit(&vigenere_output(Mode::Encrypt, key, text), CipherOutput::render)
        }
        VigenereCommands::Decrypt { key, text } => {
            out.emit(&vigenere_output(Mode::Decrypt, key, text), CipherOutput::render)
        }
    }
}

// ═══════════════════════════════════════════════════════════
// TOY RSA
// ═══════════════════════════════════════════════════════════

fn keygen(seed: Option<u64>) -> ToyRsaKeypair {
    match seed {
        Some(seed) => rsa::generate_toy_rsa_with(&mut StdRng::seed_from_u64(seed)),
        None => rsa::generate_toy_rsa(),
    }
}

fn render_keypair(kp: &ToyRsaKeypair) -> String {
    let d = kp.d.map_or_else(|| "none (no inverse)".to_string(), |d| d.to_string());
    format!(
        "\n  TOY RSA KEYPAIR\n  ===============\n\n  Prime p:    {}\n  Prime q:    {}\n  Modulus n:  {}\n  phi(n):     {}\n  Public e:   {}\n  Private d:  {}\n\n  Security rests on factoring n = p*q being hard (for large primes).",
        kp.p, kp.q, kp.n, kp.phi, kp.e, d
    )
}

#[derive(Debug, Serialize)]
struct ModExpOutput {
    mode: Mode,
    input: i64,
    exponent: u64,
    modulus: u64,
    output: u64,
}

impl ModExpOutput {
    fn render(&self) -> String {
        let (lhs, base, exp) = match self.mode {
            Mode::Encrypt => ("C", "m", "e"),
            Mode::Decrypt => ("m", "C", "d"),
        };
        format!(
            "\n  {lhs} = {base}^{exp} mod n = {}^{} mod {} = {}",
            self.input, self.exponent, self.modulus, self.output
        )
    }
}

#[derive(Debug, Serialize)]
struct DemoOutput {
    keypair: ToyRsaKeypair,
    message: i64,
    ciphertext: u64,
    decrypted: Option<u64>,
}

fn cmd_rsa(command: RsaCommands, out: &Printer) -> Result<()> {
    match command {
        RsaCommands::Keygen { seed } => {
            let kp = keygen(seed);
            out.emit(&kp, render_keypair)
        }
        RsaCommands::Encrypt { e, n, message } => {
            let n = rsa::require_modulus(n)?;
            let result = ModExpOutput {
                mode: Mode::Encrypt,
                input: message,
                exponent: e,
                modulus: n,
                output: rsa::rsa_encrypt(message, e, n),
            };
            out.emit(&result, ModExpOutput::render)
        }
        RsaCommands::Decrypt { d, n, ciphertext } => {
            let n = rsa::require_modulus(n)?;
            let result = ModExpOutput {
                mode: Mode::Decrypt,
                input: ciphertext,
                exponent: d,
                modulus: n,
                output: rsa::rsa_decrypt(ciphertext, d, n),
            };
            out.emit(&result, ModExpOutput::render)
        }
        RsaCommands::Demo { seed, message } => {
            let kp = keygen(seed);
            if message < 0 || message as u64 >= kp.n {
                tracing::warn!(message, n = kp.n, "message outside 0..n is reduced mod n first");
            }

            let ciphertext = kp.encrypt(message);
            let demo = DemoOutput {
                keypair: kp,
                message,
                ciphertext,
                decrypted: kp.decrypt(ciphertext),
            };

            out.emit(&demo, |demo| {
                let decrypted = demo
                    .decrypted
                    .map_or_else(|| "unavailable".to_string(), |m| m.to_string());
                format!(
                    "{}\n\n  m = {}\n  C = m^e mod n = {}\n  m = C^d mod n = {}",
                    render_keypair(&demo.keypair),
                    demo.message,
                    demo.ciphertext,
                    decrypted
                )
            })
        }
    }
}

// ═══════════════════════════════════════════════════════════
// LATTICE
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct ClosestOutput {
    basis: Basis,
    target: Vec2,
    degenerate: bool,
    closest: ClosestPoint,
}

#[derive(Debug, Serialize)]
struct RenderOutput {
    path: Option<PathBuf>,
    closest: ClosestPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    svg: Option<String>,
}

fn cmd_lattice(command: LatticeCommands, config: &ClassroomConfig, out: &Printer) -> Result<()> {
    match command {
        LatticeCommands::Closest { basis, target } => {
            let basis = basis.unwrap_or(config.lattice.basis);
            let target = target.unwrap_or(config.lattice.target);
            let scene = LatticeScene::new(basis, target);

            if basis.is_degenerate() {
                tracing::warn!(%basis, "degenerate basis spans only a sublattice");
            }

            let result = ClosestOutput {
                basis,
                target,
                degenerate: basis.is_degenerate(),
                closest: scene.closest,
            };
            out.emit(&result, |r| {
                format!(
                    "\n  LATTICE CLOSEST VECTOR\n  Basis:   {}\n  Target:  {}\n  Closest: {} = {}·b1 + {}·b2\n  Distance²: {}",
                    r.basis, r.target, r.closest.point, r.closest.i, r.closest.j, r.closest.distance_sq
                )
            })
        }
        LatticeCommands::Render { basis, target, output } => {
            let basis = basis.unwrap_or(config.lattice.basis);
            let target = target.unwrap_or(config.lattice.target);
            let scene = LatticeScene::new(basis, target);
            let renderer = LatticeRenderer::new(
                config.canvas.width,
                config.canvas.height,
                config.canvas.scale,
            )?
            .with_grid_radius(config.lattice.grid_radius);

            let result = match output {
                Some(path) => {
                    renderer
                        .write_svg(&scene, &path)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    RenderOutput {
                        path: Some(path),
                        closest: scene.closest,
                        svg: None,
                    }
                }
                None => RenderOutput {
                    path: None,
                    closest: scene.closest,
                    svg: Some(renderer.render_svg(&scene)),
                },
            };

            out.emit(&result, |r| match (&r.path, &r.svg) {
                (Some(path), _) => format!("\n  Wrote lattice SVG to {}", path.display()),
                (None, Some(svg)) => svg.clone(),
                (None, None) => String::new(),
            })
        }
    }
}

// ═══════════════════════════════════════════════════════════
// KYBER STORYBOARD
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct StoryStep {
    title: &'static str,
    text: &'static str,
}

#[derive(Debug, Serialize)]
struct Storyboard {
    title: &'static str,
    steps: &'static [StoryStep],
    notes: &'static [&'static str],
}

/// Conceptual walkthrough only. No Kyber arithmetic runs here.
const KYBER_STORYBOARD: Storyboard = Storyboard {
    title: "CRYSTALS-Kyber KEM (storyboard)",
    steps: &[
        StoryStep {
            title: "1. Setup",
            text: "Alice publishes a lattice-based Kyber public key (pk) and keeps the secret key (sk).",
        },
        StoryStep {
            title: "2. Encapsulate",
            text: "Bob uses pk to produce a random shared secret plus a ciphertext (ct), and sends ct to Alice.",
        },
        StoryStep {
            title: "3. Decapsulate",
            text: "Alice recovers the same shared secret from ct with sk. Both sides now hold a symmetric AES key.",
        },
        StoryStep {
            title: "Why lattices?",
            text: "Security rests on Module-LWE, believed hard even for quantum computers.",
        },
    ],
    notes: &[
        "Teaching storyboard only; no real cryptographic code is used.",
        "KEM versus traditional key exchange, and why PQC matters now.",
        "Compare key sizes, speed and hardness assumptions at a high level.",
    ],
};

impl Storyboard {
    fn render(&self) -> String {
        let mut s = format!("\n  {}\n  {}\n", self.title.to_uppercase(), "=".repeat(self.title.len()));
        for step in self.steps {
            s.push_str(&format!("\n  {}\n    {}\n", step.title, step.text));
        }
        s.push_str("\n  Notes:");
        for note in self.notes {
            s.push_str(&format!("\n    - {}", note));
        }
        s
    }
}

fn cmd_kyber(out: &Printer) -> Result<()> {
    out.emit(&KYBER_STORYBOARD, Storyboard::render)
}

fn cmd_config(config: &ClassroomConfig, out: &Printer) -> Result<()> {
    let yaml = config.to_yaml()?;
    out.emit(config, |_| yaml)
}
