use clap::{Args, Parser, Subcommand};
use hca_core::{
    collect_records, run_ingest, CoreConfig, DocumentStore, IngestError, PatientRecord,
    PatientService, StoreError,
};
use hca_summarizer::{HttpSummarizer, NoteTask, Summarizer, SummaryRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hca")]
#[command(about = "Healthcare assistant CLI")]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where patient records live.
#[derive(Args)]
struct StoreArgs {
    /// Document store root directory
    #[arg(long, global = true, env = "HCA_DATA_DIR")]
    data_dir: Option<String>,
    /// Database name
    #[arg(long, global = true, env = "HCA_DATABASE")]
    database: Option<String>,
    /// Collection name
    #[arg(long, global = true, env = "HCA_COLLECTION")]
    collection: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the patient collection with records rebuilt from a directory of FHIR bundles
    Load {
        /// Directory of Synthea FHIR bundle files
        #[arg(long, env = "SYNTHEA_OUTPUT_DIR")]
        dir: Option<String>,
        /// Assemble records and report counts without touching the store
        #[arg(long)]
        dry_run: bool,
    },
    /// List all patients
    List,
    /// Show one patient as JSON
    Show {
        /// Patient id
        id: String,
    },
    /// Explain (or summarise) a clinical note with the configured model
    Explain {
        /// Note text
        text: String,
        /// Produce a short summary instead of an explanation
        #[arg(long)]
        summary: bool,
        /// Text-to-text inference endpoint
        #[arg(long, env = "HCA_MODEL_URL")]
        model_url: String,
        /// Model name, for logs
        #[arg(long, env = "HCA_MODEL_NAME", default_value = "t5-small")]
        model_name: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hca_core=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Load { dir, dry_run }) => load(&cli.store, dir, dry_run)?,
        Some(Commands::List) => {
            let patients = open_patients(&cli.store)?.list_patients()?;
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in patients {
                    print_summary(&patient);
                }
            }
        }
        Some(Commands::Show { id }) => match open_patients(&cli.store)?.get_patient(&id)? {
            Some(patient) => println!("{}", serde_json::to_string_pretty(&patient)?),
            None => anyhow::bail!("Patient not found: {id}"),
        },
        Some(Commands::Explain {
            text,
            summary,
            model_url,
            model_name,
        }) => {
            if text.trim().is_empty() {
                anyhow::bail!("Medical text cannot be empty.");
            }
            let task = if summary {
                NoteTask::Summarize
            } else {
                NoteTask::Explain
            };
            let summarizer = HttpSummarizer::new(&model_url, &model_name);
            let request = SummaryRequest::new(task, text);

            let runtime = tokio::runtime::Runtime::new()?;
            let output = runtime.block_on(summarizer.summarize(&request))?;
            println!("{output}");
        }
        None => {
            println!("Use 'hca --help' for commands");
        }
    }

    Ok(())
}

fn core_config(store: &StoreArgs, bundle_dir: Option<String>) -> anyhow::Result<CoreConfig> {
    Ok(CoreConfig::from_values(
        store.data_dir.clone(),
        store.database.clone(),
        store.collection.clone(),
        bundle_dir,
    )?)
}

fn open_patients(store: &StoreArgs) -> anyhow::Result<PatientService> {
    let cfg = core_config(store, None)?;
    let db = DocumentStore::connect(&cfg)?;
    let collection = db.collection(cfg.collection())?;
    db.close();
    Ok(PatientService::new(collection))
}

fn load(store: &StoreArgs, dir: Option<String>, dry_run: bool) -> anyhow::Result<()> {
    let cfg = core_config(store, dir)?;

    if dry_run {
        let (records, report) = collect_records(cfg.bundle_dir())?;
        println!(
            "Dry run: {} files ({} skipped), {} entries, {} patient records",
            report.files_found, report.files_skipped, report.entries_seen, records.len()
        );
        return Ok(());
    }

    match run_ingest(&cfg) {
        Ok(report) if report.files_found == 0 => {
            println!("No JSON files found in {}", cfg.bundle_dir().display());
            Ok(())
        }
        Ok(report) if report.records_assembled == 0 => {
            println!("No patient data extracted to insert.");
            Ok(())
        }
        Ok(report) => {
            println!(
                "Cleared {} existing patient records, inserted {} from {} files",
                report.cleared, report.inserted, report.files_found
            );
            Ok(())
        }
        Err(IngestError::Store(StoreError::BulkWrite { inserted, failures })) => {
            eprintln!("Bulk write error: {inserted} inserted, {} failed", failures.len());
            for failure in &failures {
                eprintln!("  {failure}");
            }
            anyhow::bail!("{} patient records could not be written", failures.len())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_summary(patient: &PatientRecord) {
    println!(
        "ID: {}, Name: {}, Gender: {}, Born: {}, Conditions: {}, Medications: {}, Reports: {}",
        patient.id,
        patient.name,
        patient.gender,
        patient.birth_date,
        patient.conditions.len(),
        patient.medications.len(),
        patient.reports_text.len()
    );
}
