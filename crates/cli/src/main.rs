use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use telecare_core::repositories::Binding;
use telecare_core::{
    Collection, CoreConfig, ListQuery, Page, PatientForm, Practice, Sort, TaskForm, WriteOutcome,
};

#[derive(Parser)]
#[command(name = "telecare")]
#[command(about = "Telecare practice data CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Resource {
    Patients,
    Practitioners,
    Appointments,
    Tasks,
    ServiceRequests,
    MedicationRequests,
    Messages,
    Invoices,
    Coverages,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the FHIR server
    Health,
    /// List a collection
    List {
        resource: Resource,
        /// Case-insensitive text search
        #[arg(long)]
        search: Option<String>,
        /// Status label, e.g. booked, in_progress, active
        #[arg(long)]
        status: Option<String>,
        /// Only records for this patient id
        #[arg(long)]
        patient: Option<String>,
        /// Sort field; prefix with '-' for descending
        #[arg(long, allow_hyphen_values = true)]
        sort: Option<String>,
        /// 1-based page number
        #[arg(long)]
        page: Option<u32>,
        #[arg(long, default_value_t = 25)]
        page_size: u32,
    },
    /// Show one record
    Get { resource: Resource, id: String },
    /// Register a patient
    CreatePatient {
        given_name: String,
        family_name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<String>,
        #[arg(long)]
        gender: Option<String>,
    },
    /// Create a care-team task
    CreateTask {
        description: String,
        #[arg(long)]
        patient: Option<String>,
        /// low, medium, high or urgent
        #[arg(long)]
        priority: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn list<B: Binding>(collection: &Collection<B>, query: &ListQuery) -> CliResult {
    let listing = collection.list(query).await?;
    if listing.is_fallback() {
        eprintln!("FHIR server unavailable; showing sample data.");
    }
    if listing.items.is_empty() {
        println!("No records found.");
        return Ok(());
    }
    for item in &listing.items {
        println!("{}", serde_json::to_string(item)?);
    }
    println!("{} of {} shown", listing.items.len(), listing.total);
    Ok(())
}

async fn get<B: Binding>(collection: &Collection<B>, id: &str) -> CliResult {
    let fetched = collection.get(id).await?;
    if fetched.source == telecare_core::DataSource::Fallback {
        eprintln!("FHIR server unavailable; showing sample data.");
    }
    print_json(&fetched.item)
}

fn report<V: Serialize>(outcome: WriteOutcome<V>) -> CliResult {
    if let WriteOutcome::Degraded { reason, .. } = &outcome {
        eprintln!("Not saved: {reason}. The record below exists only locally.");
    }
    print_json(outcome.value())
}

#[tokio::main]
async fn main() -> CliResult {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("No command given. Use --help for usage.");
        return Ok(());
    };

    let practice = Practice::new(&CoreConfig::from_env()?)?;

    match command {
        Commands::Health => print_json(&practice.health().await)?,
        Commands::List {
            resource,
            search,
            status,
            patient,
            sort,
            page,
            page_size,
        } => {
            let query = ListQuery {
                search,
                status,
                patient_id: patient,
                sort: sort.as_deref().and_then(Sort::parse),
                page: page.map(|number| Page {
                    number,
                    size: page_size,
                }),
                ..ListQuery::default()
            };
            match resource {
                Resource::Patients => list(practice.patients(), &query).await?,
                Resource::Practitioners => list(practice.practitioners(), &query).await?,
                Resource::Appointments => list(practice.appointments(), &query).await?,
                Resource::Tasks => list(practice.tasks(), &query).await?,
                Resource::ServiceRequests => list(practice.service_requests(), &query).await?,
                Resource::MedicationRequests => {
                    list(practice.medication_requests(), &query).await?
                }
                Resource::Messages => list(practice.communications(), &query).await?,
                Resource::Invoices => list(practice.invoices(), &query).await?,
                Resource::Coverages => list(practice.coverages(), &query).await?,
            }
        }
        Commands::Get { resource, id } => match resource {
            Resource::Patients => get(practice.patients(), &id).await?,
            Resource::Practitioners => get(practice.practitioners(), &id).await?,
            Resource::Appointments => get(practice.appointments(), &id).await?,
            Resource::Tasks => get(practice.tasks(), &id).await?,
            Resource::ServiceRequests => get(practice.service_requests(), &id).await?,
            Resource::MedicationRequests => get(practice.medication_requests(), &id).await?,
            Resource::Messages => get(practice.communications(), &id).await?,
            Resource::Invoices => get(practice.invoices(), &id).await?,
            Resource::Coverages => get(practice.coverages(), &id).await?,
        },
        Commands::CreatePatient {
            given_name,
            family_name,
            email,
            phone,
            birth_date,
            gender,
        } => {
            let form = PatientForm {
                given_name,
                family_name,
                email,
                phone,
                birth_date,
                gender,
                ..PatientForm::default()
            };
            report(practice.create_patient(&form).await?)?
        }
        Commands::CreateTask {
            description,
            patient,
            priority,
            due,
        } => {
            let form = TaskForm {
                description,
                patient_id: patient,
                priority,
                due_date: due,
                ..TaskForm::default()
            };
            report(practice.create_task(&form).await?)?
        }
    }

    Ok(())
}
