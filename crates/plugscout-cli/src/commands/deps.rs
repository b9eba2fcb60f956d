//! `plugscout deps`: fetch the framework and the provider collection.

use plugscout_plugins::{DependencyError, DependencyFetcher, PrerequisiteState};
use serde::Serialize;

use crate::formatter::OutputFormat;
use crate::theme::Theme;

const PREREQUISITES: [&str; 2] = ["framework", "providers"];

#[derive(Debug, Serialize)]
struct Outcome {
    prerequisite: &'static str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub(crate) async fn fetch_dependencies(
    fetcher: &DependencyFetcher,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if format == OutputFormat::Pretty {
        print_plan(fetcher);
    }

    let result = fetcher.fetch_all().await;
    let outcomes = outcomes(result.as_ref().err());

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        OutputFormat::Pretty => {
            for outcome in &outcomes {
                match &outcome.error {
                    None => println!("{}", Theme::success(outcome.prerequisite)),
                    Some(e) => println!("{}", Theme::error(&format!("{}: {e}", outcome.prerequisite))),
                }
            }
        },
    }

    result.map_err(anyhow::Error::from)
}

fn print_plan(fetcher: &DependencyFetcher) {
    let settings = fetcher.settings();
    println!("{}", Theme::header("Fetching dependencies"));
    println!(
        "  {:<12} {}",
        "framework",
        Theme::dimmed(&fetcher.framework_command().to_string())
    );
    if fetcher.providers_state() == PrerequisiteState::Present {
        println!(
            "  {:<12} {}",
            "providers",
            Theme::dimmed(&format!(
                "already present at {}",
                settings.providers_dir.display()
            ))
        );
    } else {
        println!(
            "  {:<12} {}",
            "providers",
            Theme::dimmed(&fetcher.clone_command().to_string())
        );
    }
    println!("{}", Theme::separator());
}

fn outcomes(error: Option<&DependencyError>) -> Vec<Outcome> {
    PREREQUISITES
        .iter()
        .map(|&prerequisite| {
            let error = error.and_then(|e| {
                e.failures()
                    .iter()
                    .find(|failure| failure.task == prerequisite)
                    .map(|failure| failure.error.to_string())
            });
            Outcome {
                prerequisite,
                ok: error.is_none(),
                error,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use plugscout_plugins::{CommandError, CommandRunner, CommandSpec, DependencySettings};

    use super::*;

    #[derive(Default)]
    struct FakeRunner {
        fail: Vec<&'static str>,
        ran: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(&self, command: &CommandSpec) -> Result<(), CommandError> {
            self.ran.lock().unwrap().push(command.to_string());
            if self.fail.contains(&command.program.as_str()) {
                return Err(CommandError::Failed {
                    command: command.to_string(),
                    status: "exit status: 1".to_owned(),
                    stderr: "boom".to_owned(),
                });
            }
            Ok(())
        }
    }

    fn fetcher(gopath: &std::path::Path, runner: Arc<FakeRunner>) -> DependencyFetcher {
        DependencyFetcher::new(DependencySettings::for_gopath(gopath), runner)
    }

    #[tokio::test]
    async fn succeeds_when_both_fetches_succeed() {
        let gopath = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner::default());
        let fetcher = fetcher(gopath.path(), Arc::clone(&runner));

        fetch_dependencies(&fetcher, OutputFormat::Json).await.unwrap();
        assert_eq!(runner.ran.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reports_every_failure() {
        let gopath = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner {
            fail: vec!["go", "git"],
            ..Default::default()
        });
        let fetcher = fetcher(gopath.path(), runner);

        let err = fetch_dependencies(&fetcher, OutputFormat::Json)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("framework"), "{message}");
        assert!(message.contains("providers"), "{message}");
    }

    #[tokio::test]
    async fn outcomes_mark_only_failed_prerequisites() {
        let gopath = tempfile::tempdir().unwrap();
        let runner = Arc::new(FakeRunner {
            fail: vec!["git"],
            ..Default::default()
        });
        let fetcher = fetcher(gopath.path(), runner);

        let err = fetcher.fetch_all().await.unwrap_err();
        let outcomes = outcomes(Some(&err));
        assert!(outcomes[0].ok);
        assert!(!outcomes[1].ok);
        assert!(outcomes[1].error.as_deref().unwrap().contains("boom"));
    }

    #[test]
    fn no_error_means_all_ok() {
        assert!(outcomes(None).iter().all(|outcome| outcome.ok));
    }
}
