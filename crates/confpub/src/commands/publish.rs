//! `confpub publish` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use clap::Args;
use confpub_config::{BodyMode, CliSettings, Config};
use confpub_confluence::publisher::{DryRunResult, PlannedAction, PublishAction, PublishOutcome};
use confpub_confluence::{ConfluenceApi, ContentFormatter, PagePublisher, PublishRequest};

use super::{ConnectionArgs, connect};
use crate::error::CliError;
use crate::output::Output;

/// Title format for `--dated-title`, e.g. `19 Oct 2026 02:05:09 PM`.
const DATED_TITLE_FORMAT: &str = "%-d %b %Y %I:%M:%S %p";

/// Arguments for the publish command.
#[derive(Args, Debug)]
pub(crate) struct PublishArgs {
    /// Text file to publish.
    #[arg(short, long)]
    file: PathBuf,

    /// Page title.
    #[arg(
        short,
        long,
        required_unless_present = "dated_title",
        conflicts_with = "dated_title"
    )]
    title: Option<String>,

    /// Use the current local date and time as the page title.
    #[arg(long)]
    dated_title: bool,

    /// Create the page under this parent page (same space).
    #[arg(long)]
    parent_title: Option<String>,

    /// Body rendering mode (default: from config, or code).
    #[arg(long)]
    mode: Option<BodyMode>,

    /// Do not upload the file as an attachment.
    #[arg(long)]
    no_attach: bool,

    /// Version comment for the uploaded attachment.
    #[arg(long)]
    comment: Option<String>,

    /// Preview the change without writing to Confluence.
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is incomplete or publishing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.connection.load_config(&self.cli_settings())?;
        let confluence = config.require_confluence()?;
        let request = self.build_request(&config, confluence.require_space_key()?);
        let client = connect(confluence)?;

        run(&client, &request, self.dry_run, &output)
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            mode: self.mode,
            attach: self.no_attach.then_some(false),
            comment: self.comment.clone(),
            ..self.connection.cli_settings()
        }
    }

    fn build_request(&self, config: &Config, space_key: &str) -> PublishRequest {
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| dated_title(Local::now().naive_local()));

        PublishRequest {
            title,
            space_key: space_key.to_owned(),
            parent_title: self.parent_title.clone(),
            source: self.file.clone(),
            formatter: ContentFormatter::new(config.publish.mode)
                .annotate(config.publish.annotate),
            attach: config.publish.attach,
            attachment_comment: config.publish.comment.clone(),
        }
    }
}

/// Page title for a run at `now`.
fn dated_title(now: NaiveDateTime) -> String {
    now.format(DATED_TITLE_FORMAT).to_string()
}

fn run(
    api: &dyn ConfluenceApi,
    request: &PublishRequest,
    dry_run: bool,
    output: &Output,
) -> Result<(), CliError> {
    let publisher = PagePublisher::new(api);
    output.info(&format!(
        "Publishing {} to '{}' in space {}...",
        request.source.display(),
        request.title,
        request.space_key
    ));

    if dry_run {
        let result = publisher.dry_run(request)?;
        print_dry_run_result(output, &result, request.formatter.mode())?;
        return Ok(());
    }

    match publisher.publish(request) {
        Ok(outcome) => {
            print_publish_outcome(output, &outcome);
            Ok(())
        }
        Err(err) => {
            if let Some(page) = err.published_page() {
                output.warning(&format!("Page {} is live at {}", page.action, page.url));
            }
            Err(err.into())
        }
    }
}

fn print_dry_run_result(
    output: &Output,
    result: &DryRunResult,
    mode: BodyMode,
) -> Result<(), CliError> {
    output.highlight("\n[DRY RUN] No changes made.");
    output.field("Title", &result.title);
    output.field("Mode", &mode.to_string());

    match &result.planned {
        PlannedAction::Create { parent_id: None } => output.field("Action", "create"),
        PlannedAction::Create {
            parent_id: Some(parent_id),
        } => output.field("Action", &format!("create under page {parent_id}")),
        PlannedAction::Update { page_id, from, to } => output.field(
            "Action",
            &format!("update page {page_id} (v{from} -> v{to})"),
        ),
    }

    match &result.attachment {
        Some(filename) => output.field("Attachment", filename),
        None => output.field("Attachment", "none"),
    }

    output.info("\nBody:");
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", result.body)?;
    Ok(())
}

fn print_publish_outcome(output: &Output, outcome: &PublishOutcome) {
    let page = &outcome.page;
    match page.action {
        PublishAction::Created => output.success("\nPage created successfully!"),
        PublishAction::Updated { .. } => output.success("\nPage updated successfully!"),
    }
    output.field("ID", &page.id);
    output.field("Title", &page.title);
    match page.action {
        PublishAction::Updated { previous_version } => output.field(
            "Version",
            &format!("{} (was {previous_version})", page.version),
        ),
        PublishAction::Created => output.field("Version", &page.version.to_string()),
    }
    output.field("URL", &page.url);

    if let Some(attachment) = &outcome.attachment {
        output.field(
            "Attachment",
            &format!("{} ({})", attachment.title, attachment.id),
        );
    }
}
