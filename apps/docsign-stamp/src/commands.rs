//! Subcommand implementations

use crate::args::{InspectArgs, SignArgs, VerifyArgs};
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use docsign_core::{
    page_count, page_geometry, sign_document, verify_document, ImageEncoding, IntegrityStatus,
    SignatureAuditRecord, SignatureImage, SignaturePlacement, SigningConfig, SigningRequest,
    ViewportFrame,
};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// File config first, then `DOCSIGN_*` environment overrides
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SigningConfig> {
    let mut config = match path {
        Some(path) => SigningConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SigningConfig::default(),
    };
    config
        .apply_env()
        .context("Invalid DOCSIGN_* environment override")?;
    debug!(?config, "configuration loaded");
    Ok(config)
}

/// Explicit flag, then magic bytes, then file extension, then PNG
pub fn resolve_encoding(declared: Option<ImageEncoding>, bytes: &[u8], path: &Path) -> ImageEncoding {
    declared
        .or_else(|| ImageEncoding::sniff(bytes))
        .or_else(|| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .and_then(|ext| ext.parse().ok())
        })
        .unwrap_or(ImageEncoding::Png)
}

fn document_id(explicit: Option<&str>, input: &Path) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| {
            input
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "document".to_string())
}

fn read(path: &Path, what: &str) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {} {}", what, path.display()))
}

pub fn run_sign(args: SignArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let document = read(&args.input, "document")?;
    let image_bytes = read(&args.image, "signature image")?;
    let encoding = resolve_encoding(args.encoding, &image_bytes, &args.image);

    let viewport = match args.viewport {
        Some(size) => size.0,
        None => {
            let page = page_geometry(&document, args.page)?;
            ViewportFrame::new(page.width, page.height)
        }
    };

    let image = SignatureImage::new(image_bytes, encoding);
    let placements = args
        .rects
        .iter()
        .map(|rect| SignaturePlacement::new(rect.0, viewport, args.page, image.clone()))
        .collect();

    let request = SigningRequest {
        document_id: document_id(args.document_id.as_deref(), &args.input),
        signer: args.signer,
        signed_at: Utc::now(),
        placements,
    };

    let signed = sign_document(&config, &document, &request)?;

    fs::write(&args.output, &signed.document)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("{}  {}", signed.final_digest, args.output.display());

    if let Some(audit_path) = &args.audit {
        write_records(audit_path, &signed.records)?;
        info!(path = %audit_path.display(), records = signed.records.len(), "audit records written");
    }
    Ok(())
}

fn read_records(path: &Path) -> anyhow::Result<Vec<SignatureAuditRecord>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read audit file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse audit file {}", path.display()))
}

fn write_records(path: &Path, records: &[SignatureAuditRecord]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records).context("Failed to serialize audit records")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Verify every record and return how many were tampered
pub fn verify_records(
    records: &mut [SignatureAuditRecord],
    document: &[u8],
    verified_at: DateTime<Utc>,
) -> usize {
    records
        .iter_mut()
        .map(|record| verify_document(record, document, verified_at))
        .filter(|status| *status == IntegrityStatus::Tampered)
        .count()
}

pub fn run_verify(args: VerifyArgs) -> anyhow::Result<()> {
    let document = read(&args.input, "document")?;
    let mut records = read_records(&args.audit)?;

    let tampered = verify_records(&mut records, &document, Utc::now());
    for record in &records {
        println!("{}", record.summary());
    }
    write_records(&args.audit, &records)?;

    if tampered > 0 {
        bail!(
            "{} of {} audit records do not match {}",
            tampered,
            records.len(),
            args.input.display()
        );
    }
    Ok(())
}

pub fn run_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let document = read(&args.input, "document")?;
    let pages = page_count(&document)?;

    println!("{}: {} pages", args.input.display(), pages);
    for index in 0..pages {
        let page = page_geometry(&document, index)?;
        println!("  page {}: {:.2} x {:.2} pt", index, page.width, page.height);
    }
    Ok(())
}
