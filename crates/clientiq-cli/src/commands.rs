//! Command implementations.

use std::path::Path;

use chrono::Utc;
use crm_api::{AccessToken, Client, CrmClient, MarksFilter, TokenStore, DEFAULT_PER_PAGE};
use secrecy::SecretString;
use sendout::history::{self, sort_newest_first, status_buckets};
use sendout::{
    parse_csv_single_column, DryRunSender, Dispatcher, HistoryFilter, RecipientSet,
    SendoutError, SendoutReport, SendoutSnapshot, TemplateCatalog, TemplateSender,
};
use tokio::sync::watch;
use tracing::{info, warn};
use whatsapp_api::{StatisticsQuery, WhatsappClient};

use crate::cli::{narrow, ClientsArgs, Command, ExportFormat, RangeArgs, SendArgs, StatsArgs};
use crate::config::Config;
use crate::error::{CliError, Result};

/// Runs commands against the configured APIs.
pub struct App {
    config: Config,
    tokens: TokenStore,
}

impl App {
    pub fn new(config: Config) -> Self {
        let tokens = TokenStore::new(config.token_path.clone());
        Self { config, tokens }
    }

    /// Run a command. A rejected token is removed so the next run asks for
    /// a fresh login.
    pub async fn run(&self, command: Command) -> Result<()> {
        match self.execute(command).await {
            Err(e) if e.is_unauthorized() => {
                warn!(path = %self.tokens.path().display(), "Access token rejected, clearing");
                self.tokens.clear()?;
                Err(CliError::SessionExpired)
            }
            other => other,
        }
    }

    async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Login { username, password } => self.login(&username, password).await,
            Command::Logout => self.logout(),
            Command::Health => self.health().await,
            Command::Templates => self.templates().await,
            Command::Send(args) => self.send(args).await,
            Command::Stats(args) => self.stats(args).await,
            Command::Summary(args) => self.summary(&args).await,
            Command::Clients(args) => self.clients(args).await,
        }
    }

    fn token(&self) -> Result<AccessToken> {
        self.tokens.load(Utc::now())?.ok_or(CliError::NotLoggedIn)
    }

    fn crm(&self) -> Result<CrmClient> {
        let token = self.token()?;
        Ok(CrmClient::new(
            self.config.crm.clone().with_token(token.access_token),
        )?)
    }

    fn messaging(&self) -> Result<WhatsappClient> {
        let token = self.token()?;
        Ok(WhatsappClient::new(
            self.config.messaging.clone().with_token(token.access_token),
        )?)
    }

    async fn login(&self, username: &str, password: String) -> Result<()> {
        let client = CrmClient::new(self.config.crm.clone())?;
        let response = client
            .login(username, &SecretString::from(password))
            .await?;

        let token = AccessToken::from_login(response, Utc::now())?;
        self.tokens.save(&token)?;
        println!("Logged in, token valid until {}", token.expires_at);
        Ok(())
    }

    fn logout(&self) -> Result<()> {
        self.tokens.clear()?;
        info!(path = %self.tokens.path().display(), "Logged out");
        println!("Logged out");
        Ok(())
    }

    async fn health(&self) -> Result<()> {
        let health = self.messaging()?.health().await?;
        let indicator = if health.is_healthy() { "OK" } else { "NOT READY" };
        println!(
            "Messaging API: {} (status: {}, api key valid: {})",
            indicator,
            health.status.as_deref().unwrap_or("unknown"),
            health.api_key_valid
        );
        Ok(())
    }

    async fn templates(&self) -> Result<()> {
        let templates = self.messaging()?.templates().await?;
        if templates.is_empty() {
            println!("No templates available");
        }
        for template in &templates {
            println!("{}", template);
        }
        Ok(())
    }

    async fn send(&self, args: SendArgs) -> Result<()> {
        let client = self.messaging()?;

        match client.health().await {
            Ok(health) if health.is_healthy() => {}
            Ok(health) => warn!(status = ?health.status, "Messaging API is not ready, sending anyway"),
            Err(e) => warn!(error = %e, "Messaging API health check failed, sending anyway"),
        }

        let catalog = TemplateCatalog::new(client.templates().await?);
        let template = match args.template.as_deref() {
            Some(name) => catalog.select(name)?,
            None => catalog.default_selection().ok_or(SendoutError::NoTemplate)?,
        };

        let recipients = load_recipients(args.numbers.as_deref(), args.csv.as_deref()).await?;
        if recipients.is_empty() {
            return Err(SendoutError::NoRecipients.into());
        }

        let mut config = self.config.sendout.clone();
        if let Some(workers) = args.workers {
            config = config.with_workers(workers).validate()?;
        }

        info!(
            template = %template.name,
            language = %template.language,
            recipients = recipients.len(),
            dry_run = args.dry_run,
            "Preparing sendout"
        );

        let sender: Box<dyn TemplateSender> = if args.dry_run {
            Box::new(DryRunSender)
        } else {
            Box::new(client)
        };
        let dispatcher = Dispatcher::new(sender, config);
        let progress = tokio::spawn(log_progress(dispatcher.subscribe()));

        let numbers = recipients.into_vec();
        let outcome = tokio::select! {
            report = dispatcher.run(&numbers, &template.name) => Some(report?),
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            Some(report) => {
                let _ = progress.await;
                print_report(&report);
            }
            None => {
                progress.abort();
                let snapshot = dispatcher.subscribe().borrow().clone();
                warn!(
                    completed = snapshot.completed,
                    total = snapshot.total,
                    "Interrupted, remaining recipients were not sent"
                );
                print_records(&snapshot);
            }
        }
        Ok(())
    }

    async fn stats(&self, args: StatsArgs) -> Result<()> {
        let response = self
            .messaging()?
            .statistics(StatisticsQuery {
                limit: args.limit,
                offset: None,
            })
            .await?;

        let filter = HistoryFilter {
            status: args.status,
            template: args.template,
            from: args.from,
            to: args.to,
        };
        let mut records = filter.apply(&response.messages);
        sort_newest_first(&mut records);

        if let Some(format) = args.export {
            let contents = match format {
                ExportFormat::Csv => history::to_csv(&records),
                ExportFormat::Json => history::to_json(&response.statistics, &records)?,
            };
            let out = args
                .out
                .unwrap_or_else(|| format.default_file().into());
            tokio::fs::write(&out, contents).await?;
            info!(path = %out.display(), messages = records.len(), "Exported message history");
            return Ok(());
        }

        let buckets = status_buckets(&records);
        let counts: Vec<String> = buckets
            .iter()
            .map(|(status, count)| format!("{}: {}", status, count))
            .collect();
        println!("{} messages ({})", records.len(), counts.join(", "));

        if args.no_group {
            for record in &records {
                println!("{}", history_line(record));
            }
            return Ok(());
        }

        for group in history::group_sendouts(&records, args.group_secs) {
            let span = match (group.start, group.end) {
                (Some(start), Some(end)) => format!(
                    "{} – {}",
                    start.format("%Y-%m-%d %H:%M:%S"),
                    end.format("%H:%M:%S")
                ),
                _ => "unknown time".to_string(),
            };
            println!(
                "\n{} · {} messages · {}",
                span,
                group.len(),
                group.unique_templates.join(", ")
            );
            for record in &group.messages {
                println!("  {}", history_line(record));
            }
        }
        Ok(())
    }

    async fn summary(&self, args: &RangeArgs) -> Result<()> {
        let range = args.resolve()?;
        let crm = self.crm()?;

        let summary = crm.summary(&range).await?;
        let distribution = crm.distribution(&range).await?;

        println!("Dashboard summary for {}", range);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        println!("{}", serde_json::to_string_pretty(&distribution)?);
        Ok(())
    }

    async fn clients(&self, args: ClientsArgs) -> Result<()> {
        let range = args.range.resolve()?;
        let clients: Vec<Client> = self
            .crm()?
            .all_clients(&range, DEFAULT_PER_PAGE)
            .await?
            .into_iter()
            .map(Client::from)
            .collect();

        let filter = marks_filter(&clients, &args);
        let matching = filter.apply(&clients);
        println!(
            "{} of {} clients match ({})",
            matching.len(),
            clients.len(),
            range
        );

        for client in matching.iter().take(args.limit) {
            println!(
                "{}\t{}\t{}\tengage {:.1}\tpurchase {:.1}\tchurn {:.1}\tltv {:.0}",
                client.id,
                client.client_name.as_deref().unwrap_or("-"),
                client.client_phone_number.as_deref().unwrap_or("-"),
                client.marks.like_to_engage,
                client.marks.like_to_purchase,
                client.marks.like_to_churn,
                client.marks.ltv
            );
        }
        Ok(())
    }
}

/// Merge numbers from the command line and an optional CSV file.
async fn load_recipients(numbers: Option<&str>, csv: Option<&Path>) -> Result<RecipientSet> {
    let rows = match csv {
        Some(path) => {
            let text = tokio::fs::read_to_string(path).await?;
            parse_csv_single_column(&text).map_err(SendoutError::from)?
        }
        None => Vec::new(),
    };
    Ok(RecipientSet::merge(numbers.unwrap_or_default(), &rows))
}

fn marks_filter(clients: &[Client], args: &ClientsArgs) -> MarksFilter {
    let base = MarksFilter::for_clients(clients);
    MarksFilter {
        like_to_engage: narrow(base.like_to_engage, args.min_engage, args.max_engage),
        like_to_purchase: narrow(base.like_to_purchase, args.min_purchase, args.max_purchase),
        like_to_churn: narrow(base.like_to_churn, args.min_churn, args.max_churn),
        ltv: narrow(base.ltv, args.min_ltv, args.max_ltv),
    }
}

async fn log_progress(mut updates: watch::Receiver<SendoutSnapshot>) {
    let mut last = None;
    while updates.changed().await.is_ok() {
        let (progress, completed, total, finished) = {
            let snapshot = updates.borrow_and_update();
            (
                snapshot.progress,
                snapshot.completed,
                snapshot.total,
                snapshot.finished,
            )
        };
        if last != Some(progress) {
            info!(progress, completed, total, "Sendout progress");
            last = Some(progress);
        }
        if finished {
            break;
        }
    }
}

fn print_records(snapshot: &SendoutSnapshot) {
    for (recipient, record) in &snapshot.records {
        let detail = if record.status == sendout::SendStatus::Sent {
            record
                .external_message_id
                .as_deref()
                .or(record.message_id.as_deref())
                .unwrap_or("")
        } else {
            record.last_error.as_deref().unwrap_or("")
        };
        println!(
            "{}\t{}\t{} attempt(s)\t{}",
            recipient, record.status, record.attempts, detail
        );
    }
}

fn print_report(report: &SendoutReport) {
    print_records(&report.snapshot);
    println!(
        "\nTemplate {}: {} sent, {} failed, {} pause(s), {:.1}s",
        report.template,
        report.sent(),
        report.failed(),
        report.snapshot.pauses,
        report.elapsed.as_secs_f64()
    );
}

fn history_line(record: &whatsapp_api::MessageRecord) -> String {
    [
        &record.created_at,
        &record.phone_number,
        &record.status,
        &record.template_name,
        &record.external_message_id,
    ]
    .map(|field| field.as_deref().unwrap_or("-"))
    .join("\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_recipients_merges_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "+380733927425\n380733927426").unwrap();

        let set = load_recipients(Some("380733927425; 380733927427"), Some(file.path()))
            .await
            .unwrap();

        assert_eq!(
            set.into_vec(),
            vec!["380733927425", "380733927427", "380733927426"]
        );
    }

    #[tokio::test]
    async fn test_load_recipients_rejects_multi_column_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "380733927425,Olena").unwrap();

        let err = load_recipients(None, Some(file.path())).await.unwrap_err();
        assert!(matches!(err, CliError::Sendout(SendoutError::Recipients(_))));
    }

    #[tokio::test]
    async fn test_missing_token_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            crm: crm_api::CrmConfig::new("http://127.0.0.1:59997"),
            messaging: whatsapp_api::ApiConfig::new("http://127.0.0.1:59997"),
            token_path: dir.path().join("token.json"),
            sendout: sendout::SendoutConfig::default(),
        };
        let app = App::new(config);

        let err = app.run(Command::Templates).await.unwrap_err();
        assert!(matches!(err, CliError::NotLoggedIn));
    }

    #[test]
    fn test_history_line() {
        let record = whatsapp_api::MessageRecord {
            created_at: Some("2025-03-01T10:00:00Z".to_string()),
            phone_number: Some("380733927425".to_string()),
            status: Some("read".to_string()),
            ..Default::default()
        };
        assert_eq!(
            history_line(&record),
            "2025-03-01T10:00:00Z\t380733927425\tread\t-\t-"
        );
    }
}
