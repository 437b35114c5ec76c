//! notary-cli
//!
//! Drives a single Digital Notary instance through its full lifecycle.
//! Reads and writes the canonical textual form of certificates, documents
//! and citations as plain files.
//!
//! Usage:
//!   notary generate-key             [--dir <path>]
//!   notary notarize <component-file> [--dir <path>]
//!   notary activate-key <document-file> [--dir <path>]
//!   notary get-citation             [--dir <path>]
//!   notary validate <document-file> <certifying-document-file> [--dir <path>]
//!   notary cite <document-file>     [--dir <path>]
//!   notary citation-matches <citation-file> <document-file> [--dir <path>]
//!   notary refresh-key              [--dir <path>]
//!   notary forget-key               [--dir <path>]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use notary_core::DigitalNotary;
use notary_store::FileConfigStore;
use notary_value::{Catalog, Value};

#[derive(Parser, Debug)]
#[command(name = "notary", version, about = "Digital Notary — key lifecycle and document notarization")]
struct Args {
    /// Configuration directory holding ssm.bali and notary.bali.
    #[arg(long, global = true, default_value = "~/.bali")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new signing key and stash an unsigned certificate.
    GenerateKey,

    /// Notarize the contents of a file as a component.
    Notarize {
        /// Path to the file whose contents become the notarized `$component`.
        component_file: PathBuf,
    },

    /// Activate the stashed key with an externally-signed certificate.
    ActivateKey {
        /// Path to the notarized document wrapping the signed certificate.
        document_file: PathBuf,
    },

    /// Print the notary's current citation.
    GetCitation,

    /// Verify a document's signature against a certifying document.
    Validate {
        document_file: PathBuf,
        certifying_document_file: PathBuf,
    },

    /// Compute a citation for a document without storing it.
    Cite { document_file: PathBuf },

    /// Check whether a citation matches a document's current bytes.
    CitationMatches { citation_file: PathBuf, document_file: PathBuf },

    /// Rotate the signing key and chain a new certificate to it.
    RefreshKey,

    /// Erase all key material and persisted state.
    ForgetKey,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn,notary=info").init();

    let args = Args::parse();
    let dir = expand_tilde(&args.dir);
    std::fs::create_dir_all(&dir).with_context(|| format!("creating configuration directory {}", dir.display()))?;

    let ssm_store = FileConfigStore::new(&dir, "ssm.bali");
    let notary_store = FileConfigStore::new(&dir, "notary.bali");
    let mut notary = DigitalNotary::load(ssm_store, notary_store)
        .await
        .map_err(|e| anyhow::anyhow!("loading notary configuration: {e}"))?;

    match args.command {
        Command::GenerateKey => {
            let certificate = notary.generate_key().await.map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("{}", certificate.to_canonical_text());
        }

        Command::Notarize { component_file } => {
            let content = std::fs::read_to_string(&component_file)
                .with_context(|| format!("reading {}", component_file.display()))?;
            let document = notary
                .notarize_component(Value::Text(content))
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("{}", document.to_canonical_text());
        }

        Command::ActivateKey { document_file } => {
            let signed = read_catalog(&document_file)?;
            let citation = notary.activate_key(signed).await.map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("{}", citation.to_canonical_text());
        }

        Command::GetCitation => {
            let citation = notary.get_citation().await.map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("{}", citation.to_canonical_text());
        }

        Command::Validate { document_file, certifying_document_file } => {
            let document = read_catalog(&document_file)?;
            let certifying = read_catalog(&certifying_document_file)?;
            let valid = notary.validate_document(&document, &certifying).map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("{valid}");
        }

        Command::Cite { document_file } => {
            let document = read_catalog(&document_file)?;
            let citation = notary.cite_document(&document).map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("{}", citation.to_canonical_text());
        }

        Command::CitationMatches { citation_file, document_file } => {
            let citation = read_catalog(&citation_file)?;
            let document = read_catalog(&document_file)?;
            let matches = notary.citation_matches(&citation, &document).map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("{matches}");
        }

        Command::RefreshKey => {
            let certificate = notary.refresh_key().await.map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("{}", certificate.to_canonical_text());
        }

        Command::ForgetKey => {
            notary.forget_key().await.map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("Notary configuration erased.");
        }
    }

    Ok(())
}

fn read_catalog(path: &PathBuf) -> anyhow::Result<Catalog> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Catalog::parse(&text).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.clone()
}
