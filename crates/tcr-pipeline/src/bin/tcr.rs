use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tcr_adapters::{GeminiClient, GeminiConfig};
use tcr_model::{
    EvidenceKind, EvidenceSet, Geolocation, Language, Locale, ReportRecord, SessionConfig,
    VehicleLabel,
};
use tcr_package::{ReportPackager, ZipPackager};
use tcr_pipeline::{PipelineConfig, ReportPipeline, Services, Step};
use tracing_subscriber::EnvFilter;

/// Evidence flags and the classification they imply
const EVIDENCE_FLAGS: [(&str, EvidenceKind, Option<VehicleLabel>); 5] = [
    ("scene", EvidenceKind::Scene, None),
    ("document-a", EvidenceKind::Document, Some(VehicleLabel::A)),
    ("document-b", EvidenceKind::Document, Some(VehicleLabel::B)),
    ("audio-a", EvidenceKind::Audio, Some(VehicleLabel::A)),
    ("audio-b", EvidenceKind::Audio, Some(VehicleLabel::B)),
];

fn evidence_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .action(ArgAction::Append)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn cli() -> Command {
    Command::new("tcr")
        .version(tcr_pipeline::VERSION)
        .about("Traffic collision report assembly")
        .subcommand_required(true)
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("process")
                .about("Extract a draft report from evidence files")
                .arg(
                    Arg::new("locale")
                        .long("locale")
                        .default_value("UK")
                        .help("Jurisdiction: UK, CA, NY or TR"),
                )
                .arg(
                    Arg::new("language")
                        .long("language")
                        .default_value("EN")
                        .help("Response language: EN or TR"),
                )
                .arg(evidence_arg("scene", "Scene photo or video"))
                .arg(evidence_arg("document-a", "Document of driver A"))
                .arg(evidence_arg("document-b", "Document of driver B"))
                .arg(evidence_arg("audio-a", "Spoken statement of driver A"))
                .arg(evidence_arg("audio-b", "Spoken statement of driver B"))
                .arg(
                    Arg::new("lat")
                        .long("lat")
                        .requires("lng")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .help("Device latitude"),
                )
                .arg(
                    Arg::new("lng")
                        .long("lng")
                        .requires("lat")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .help("Device longitude"),
                )
                .arg(
                    Arg::new("answer")
                        .long("answer")
                        .help("Free-text answer to the open questions"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Pipeline configuration (TOML)"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write record and questions here instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("package")
                .about("Package a signed record with its evidence")
                .arg(
                    Arg::new("record")
                        .long("record")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Record JSON"),
                )
                .arg(evidence_arg("evidence", "Evidence file to include"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .default_value(".")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory receiving the zip archive"),
                ),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json"));

    match matches.subcommand() {
        Some(("process", args)) => process(args).await,
        Some(("package", args)) => package(args).await,
        _ => Ok(()),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn process(args: &ArgMatches) -> anyhow::Result<()> {
    let locale: Locale = arg_str(args, "locale").parse()?;
    let language: Language = arg_str(args, "language").parse()?;
    let pipeline_config = match args.get_one::<PathBuf>("config") {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::new(),
    };

    let gemini = GeminiConfig::from_env().context("GEMINI_API_KEY (or API_KEY) must be set")?;
    let client = GeminiClient::new(gemini)?;
    let pipeline = ReportPipeline::new(Services::shared(Arc::new(client)), pipeline_config);

    pipeline.start()?;
    pipeline.select_config(SessionConfig::new(locale, language))?;
    if let (Some(lat), Some(lng)) = (args.get_one::<f64>("lat"), args.get_one::<f64>("lng")) {
        pipeline.set_geolocation(Some(Geolocation::new(*lat, *lng)));
    }

    for (flag, kind, owner) in EVIDENCE_FLAGS {
        for path in args.get_many::<PathBuf>(flag).into_iter().flatten() {
            let (name, mime, bytes) = read_evidence(path).await?;
            let id = pipeline.add_evidence(name, mime, bytes)?;
            pipeline.reclassify_evidence(id, kind, owner)?;
        }
    }

    let outcome = pipeline.submit().await?;
    if outcome.step == Step::BlurryDocumentPause {
        if let Some(warning) = &outcome.quality_warning {
            eprintln!("warning: {}", warning.question);
        }
        pipeline.continue_anyway()?;
    }
    if outcome.synthesis.diagram_degraded {
        eprintln!("diagram synthesis failed, placeholder used");
    }
    if outcome.synthesis.sketch_degraded {
        eprintln!("sketch synthesis failed, no sketch");
    }

    if let Some(answer) = args.get_one::<String>("answer") {
        if !pipeline.questions().is_empty() {
            let clarified = pipeline.clarify(answer).await?;
            eprintln!("answer applied, {} questions cleared", clarified.cleared);
        }
    }

    let output = json!({
        "record": pipeline.record(),
        "questions": pipeline.questions(),
    });
    let text = serde_json::to_string_pretty(&output)?;
    match args.get_one::<PathBuf>("out") {
        Some(path) => tokio::fs::write(path, text)
            .await
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{text}"),
    }

    pipeline.end();
    Ok(())
}

async fn package(args: &ArgMatches) -> anyhow::Result<()> {
    let record_path = args
        .get_one::<PathBuf>("record")
        .context("--record is required")?;
    let text = tokio::fs::read_to_string(record_path)
        .await
        .with_context(|| format!("reading {}", record_path.display()))?;
    let record = parse_record(&text)?;
    if !record.has_any_signature() {
        bail!("at least one driver must sign the report");
    }
    if !record.has_full_consent() {
        bail!("both drivers must give consent");
    }

    let mut evidence = EvidenceSet::new();
    for path in args.get_many::<PathBuf>("evidence").into_iter().flatten() {
        let (name, mime, bytes) = read_evidence(path).await?;
        evidence.ingest(name, mime, bytes)?;
    }

    let out = args
        .get_one::<PathBuf>("out")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let receipt = ZipPackager::new(out)
        .package(&record, evidence.items())
        .await?;
    evidence.previews().release_all();

    println!("{}", receipt.location.display());
    for file in &receipt.files {
        println!("  {file}");
    }
    Ok(())
}

/// Accept either a bare record or the `process` output wrapping one
fn parse_record(text: &str) -> anyhow::Result<ReportRecord> {
    let mut value: serde_json::Value = serde_json::from_str(text)?;
    if let Some(inner) = value.get_mut("record") {
        value = inner.take();
    }
    Ok(serde_json::from_value(value)?)
}

fn arg_str<'a>(args: &'a ArgMatches, name: &str) -> &'a str {
    args.get_one::<String>(name).map_or("", String::as_str)
}

async fn read_evidence(path: &Path) -> anyhow::Result<(String, String, Vec<u8>)> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(|| "evidence".to_string(), |n| n.to_string_lossy().into_owned());
    let mime = mime_for(&name).to_string();
    Ok((name, mime, bytes))
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "webm" => "audio/webm",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for("IMG_0001.JPG"), "image/jpeg");
        assert_eq!(mime_for("statement.m4a"), "audio/mp4");
        assert!(mime_for("policy.docx").starts_with("application/vnd.openxmlformats"));
        assert_eq!(mime_for("README"), "application/octet-stream");
    }

    #[test]
    fn process_output_is_accepted_as_record() {
        let record = tcr_test_utils::signed_record(tcr_test_utils::uk_config());
        let wrapped = json!({ "record": record, "questions": [] }).to_string();
        assert_eq!(parse_record(&wrapped).unwrap(), record);
        let bare = serde_json::to_string(&record).unwrap();
        assert_eq!(parse_record(&bare).unwrap(), record);
    }
}
