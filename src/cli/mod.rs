//! Command tree for deckhand
//!
//! - `app`: create, delete, get and list applications
//! - `pipeline`: save, list, get and delete pipeline configs
//! - `pipeline-template`: publish, plan and delete pipeline templates
//! - `completions`: generate shell completions

pub mod completions;
mod loader;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use deckhand::api::{ApplicationApi, GateClient, PipelineApi, PublishTemplateOptions, SessionApi};
use deckhand::infrastructure::{Config, init_logging, log_level};
use deckhand::ops::{self, MonitorOptions, PlanReport, TaskReport, TaskRunner};
use deckhand::task::TaskOutcome;
use tracing::{debug, info, warn};

/// CLI arguments for deckhand
#[derive(Parser, Debug)]
#[command(name = "deckhand")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

/// Flags accepted by every command; they override the environment
#[derive(clap::Args, Debug, Default)]
struct GlobalArgs {
    /// Show debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Silence log messages except errors
    #[arg(short, long, global = true)]
    silent: bool,

    /// API endpoint [env: SPINNAKER_API]
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// HTTPS x509 cert path [env: SPINNAKER_CLIENT_CERT]
    #[arg(short = 'c', long, global = true)]
    cert_path: Option<PathBuf>,

    /// HTTPS x509 key path [env: SPINNAKER_CLIENT_KEY]
    #[arg(short = 'k', long, global = true)]
    key_path: Option<PathBuf>,

    /// Bearer token sent with every request [env: SPINNAKER_IAP_TOKEN]
    #[arg(long, global = true)]
    iap_token: Option<String>,

    /// Session cookie value [env: SPINNAKER_API_SESSION]
    #[arg(long, global = true)]
    api_session: Option<String>,

    /// Skip server certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Per-request HTTP timeout in seconds [env: SPINNAKER_CLIENT_TIMEOUT]
    #[arg(long, global = true)]
    client_timeout: Option<u64>,

    /// Seconds to wait for a task to finish [env: DECKHAND_TASK_TIMEOUT]
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Submit tasks without waiting for them to finish
    #[arg(long, global = true)]
    no_monitor: bool,

    /// Username for form login
    #[arg(long, global = true, requires = "fiat_pass")]
    fiat_user: Option<String>,

    /// Password for form login
    #[arg(long, global = true, requires = "fiat_user")]
    fiat_pass: Option<String>,
}

impl GlobalArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(path) = &self.cert_path {
            config.cert_path = Some(path.clone());
        }
        if let Some(path) = &self.key_path {
            config.key_path = Some(path.clone());
        }
        if let Some(token) = &self.iap_token {
            config.iap_token = Some(token.clone());
        }
        if let Some(session) = &self.api_session {
            config.api_session = Some(session.clone());
        }
        if let Some(secs) = self.client_timeout {
            config.client_timeout_secs = secs;
        }
        if let Some(secs) = self.timeout {
            config.task_timeout_secs = secs;
        }
        config.insecure |= self.insecure;
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Application tasks
    App {
        #[command(subcommand)]
        command: AppCommand,
    },

    /// Pipeline config tasks
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommand,
    },

    /// Pipeline template tasks
    PipelineTemplate {
        #[command(subcommand)]
        command: TemplateCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum AppCommand {
    /// Create an application
    Create {
        /// Application name
        name: String,
        /// Owner email
        email: String,
    },
    /// Delete an application
    Delete {
        /// Application name
        name: String,
    },
    /// Print an application
    Get {
        /// Application name
        name: String,
    },
    /// List application names
    List,
}

#[derive(Subcommand, Debug)]
enum PipelineCommand {
    /// Save a pipeline from a templated pipeline configuration
    Save {
        /// Configuration file (YAML)
        file: PathBuf,
    },
    /// Save a pipeline from raw pipeline JSON
    SaveJson {
        /// Pipeline file (JSON)
        file: PathBuf,
    },
    /// List pipeline names of an application
    List {
        /// Application name
        app: String,
    },
    /// Print a pipeline config
    Get {
        /// Application name
        app: String,
        /// Pipeline name
        name: String,
    },
    /// Delete a pipeline
    Delete {
        /// Application name
        app: String,
        /// Pipeline name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum TemplateCommand {
    /// Publish a pipeline template, creating or updating it
    Publish {
        /// Template file (YAML or JSON)
        file: PathBuf,
        /// Deprecated: publish always creates or updates
        #[arg(short, long)]
        update: bool,
        /// Do not re-plan dependent pipelines
        #[arg(long)]
        skip_plan: bool,
        /// Override the template id
        #[arg(long)]
        template_id: Option<String>,
        /// Override the template source
        #[arg(long)]
        source: Option<String>,
    },
    /// Validate a pipeline template and/or plan a configuration
    ///
    /// Prints either the validation errors or the final pipeline JSON that
    /// would be executed.
    Plan {
        /// Configuration file (YAML)
        file: PathBuf,
        /// Template to plan against instead of the configured source
        #[arg(long)]
        template: Option<PathBuf>,
    },
    /// Delete a pipeline template
    Delete {
        /// Template id
        id: String,
    },
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    Args::command()
}

/// Parse and execute CLI arguments
pub fn run() -> Result<()> {
    let args = Args::parse();

    if let Command::Completions { shell, output } = &args.command {
        return completions::emit(*shell, output.as_deref());
    }

    let mut config = Config::from_env().context("reading configuration from environment")?;
    args.global.apply(&mut config);
    init_logging(log_level(args.global.verbose, args.global.silent, &config.log_level));
    debug!(?config, "Resolved configuration");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(execute(args.command, &args.global, &config))
}

async fn execute(command: Command, global: &GlobalArgs, config: &Config) -> Result<()> {
    let client_config = config
        .client_config()
        .context("invalid client configuration")?;
    let client = GateClient::from_config(&client_config).context("creating spinnaker client")?;

    if let (Some(user), Some(pass)) = (&global.fiat_user, &global.fiat_pass) {
        client.login(user, pass).await.context("logging in")?;
    }

    let runner = TaskRunner::new(MonitorOptions {
        monitor: !global.no_monitor,
        timeout: config.task_timeout().context("invalid task timeout")?,
    });

    match command {
        Command::App { command } => app(&client, &runner, command).await,
        Command::Pipeline { command } => pipeline(&client, command).await,
        Command::PipelineTemplate { command } => template(&client, &runner, command).await,
        Command::Completions { .. } => Ok(()),
    }
}

async fn app(client: &GateClient, runner: &TaskRunner, command: AppCommand) -> Result<()> {
    match command {
        AppCommand::Create { name, email } => {
            let report = ops::create_application(client, runner, &name, &email)
                .await
                .with_context(|| format!("creating application {name}"))?;
            finish_task(report)
        }
        AppCommand::Delete { name } => {
            let report = ops::delete_application(client, runner, &name)
                .await
                .with_context(|| format!("deleting application {name}"))?;
            finish_task(report)
        }
        AppCommand::Get { name } => {
            info!(app = %name, "Fetching application");
            let Some(body) = client
                .get_application(&name)
                .await
                .context("fetching app info")?
            else {
                println!("App does not exist or insufficient permission");
                bail!("could not fetch app info for {name}");
            };
            println!("{}", render::pretty_json(&body));
            Ok(())
        }
        AppCommand::List => {
            info!("Fetching application list");
            let apps = client
                .list_applications()
                .await
                .context("fetching application list")?;
            for app in apps {
                println!("{}", app.name);
            }
            Ok(())
        }
    }
}

async fn pipeline(client: &GateClient, command: PipelineCommand) -> Result<()> {
    match command {
        PipelineCommand::Save { file } => {
            let configuration = loader::load_map(&file)?;
            let saved = ops::save_templated_pipeline(client, &configuration)
                .await
                .context("saving pipeline config")?;
            info!(app = %saved.application, pipeline = %saved.name, "Pipeline saved");
            Ok(())
        }
        PipelineCommand::SaveJson { file } => {
            let config = loader::load_pipeline_json(&file)?;
            let saved = ops::save_pipeline(client, config)
                .await
                .context("saving pipeline config")?;
            info!(app = %saved.application, pipeline = %saved.name, "Pipeline saved");
            Ok(())
        }
        PipelineCommand::List { app } => {
            debug!(app = %app, "Fetching pipelines");
            let pipelines = client
                .list_pipeline_configs(&app)
                .await
                .with_context(|| format!("fetching pipelines of {app}"))?;
            for pipeline in pipelines {
                println!("{}", pipeline.name);
            }
            Ok(())
        }
        PipelineCommand::Get { app, name } => {
            debug!(app = %app, pipeline = %name, "Fetching pipeline");
            let Some(config) = client
                .get_pipeline_config(&app, &name)
                .await
                .context("fetching pipeline")?
            else {
                bail!("pipeline {name} not found in application {app}");
            };
            let json = serde_json::to_string_pretty(&config).context("encoding pipeline")?;
            println!("{json}");
            Ok(())
        }
        PipelineCommand::Delete { app, name } => {
            info!(app = %app, pipeline = %name, "Deleting pipeline");
            client
                .delete_pipeline(&app, &name)
                .await
                .with_context(|| format!("deleting pipeline {name}"))?;
            Ok(())
        }
    }
}

async fn template(client: &GateClient, runner: &TaskRunner, command: TemplateCommand) -> Result<()> {
    match command {
        TemplateCommand::Publish {
            file,
            update,
            skip_plan,
            template_id,
            source,
        } => {
            if update {
                warn!("The `update` flag is deprecated, `publish` always creates or updates the template");
            }
            let template = loader::load_map(&file)?;
            let options = PublishTemplateOptions {
                skip_plan,
                template_id,
                source,
            };
            let report = ops::publish_template(client, runner, template, &options)
                .await
                .context("publishing template")?;
            finish_task(report)
        }
        TemplateCommand::Plan { file, template } => {
            let configuration = loader::load_map(&file)?;
            let template = template.as_deref().map(loader::load_map).transpose()?;

            match ops::plan(client, &configuration, template.as_ref())
                .await
                .context("planning configuration")?
            {
                PlanReport::Planned(body) => {
                    println!("{}", render::pretty_json(&body));
                    Ok(())
                }
                PlanReport::Rejected { body, errors } => {
                    match errors {
                        Some(errors) => print!("{}", render::validation_errors(&errors)),
                        None => println!("{}", render::pretty_json(&body)),
                    }
                    bail!("pipeline template is invalid")
                }
            }
        }
        TemplateCommand::Delete { id } => {
            let report = ops::delete_template(client, runner, &id)
                .await
                .with_context(|| format!("deleting pipeline template {id}"))?;
            finish_task(report)
        }
    }
}

/// Prints the server body behind a failed call, if there is one
pub fn print_error_body(err: &anyhow::Error) {
    if let Some(body) = render::error_body(err) {
        println!("{body}");
    }
}

/// Prints the result of an asynchronous operation; a failed task is an error
fn finish_task(report: TaskReport) -> Result<()> {
    match report {
        TaskReport::Submitted(task_ref) => {
            println!("{task_ref}");
            Ok(())
        }
        TaskReport::Finished(TaskOutcome::Succeeded(_)) => Ok(()),
        TaskReport::Finished(TaskOutcome::Failed { execution, detail }) => {
            println!("{}", render::task_failure(&execution, &detail));
            bail!("task finished with status {}", execution.status)
        }
    }
}
