//! Interface de linha de comando do localjob baseada em clap.
//!
//! Define a struct [`Cli`] com o arquivo de entrada posicional e flags que
//! sobrescrevem a configuração (--api-url, --license-file, --poll-interval...).

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::LocalJobConfig;
use crate::runner::RunSettings;

/// Envia um arquivo para a API de jobs, aguarda a conclusão e imprime o resultado.
///
/// Antes do envio, verifica se há licença instalada no servidor e, se não
/// houver, envia o arquivo de licença.
#[derive(Debug, Parser)]
#[command(name = "localjob", version, about)]
pub struct Cli {
    /// Arquivo a ser processado.
    pub input: PathBuf,

    /// URL base da API (padrão: http://localhost:9090/).
    #[arg(long)]
    pub api_url: Option<String>,

    /// Arquivo de licença enviado quando o servidor não tem licença.
    #[arg(long)]
    pub license_file: Option<PathBuf>,

    /// Segundos entre consultas de status.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: Option<u64>,

    /// Desiste após N consultas de status.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_polls: Option<u32>,

    /// Sobrescreve o campo MimeType enviado com o job.
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Arquivo de configuração TOML (padrão: ./localjob.toml, se existir).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Também grava o resultado JSON neste arquivo.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Combina a configuração carregada com as flags; flags têm precedência.
    /// Retorna a URL da API e as opções da execução.
    pub fn settings(&self, config: LocalJobConfig) -> (String, RunSettings) {
        let license_file = self
            .license_file
            .clone()
            .unwrap_or_else(|| config.license_path());
        let api_url = self.api_url.clone().unwrap_or(config.api_url);
        let poll_interval = self.poll_interval.unwrap_or(config.poll_interval_secs);

        let mut form = config.job;
        if let Some(mime) = &self.mime_type {
            form.mime_type = mime.clone();
        }

        let settings = RunSettings {
            license_file,
            poll_interval: Duration::from_secs(poll_interval),
            max_polls: self.max_polls.or(config.max_polls),
            form,
            output: self.output.clone(),
        };
        (api_url, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parses_input_file() {
        let cli = Cli::parse_from(["localjob", "data.csv"]);
        assert_eq!(cli.input, PathBuf::from("data.csv"));
        assert!(cli.api_url.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn cli_requires_input_file() {
        let err = Cli::try_parse_from(["localjob"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn cli_short_help_requests_help_display() {
        let err = Cli::try_parse_from(["localjob", "-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());
    }

    #[test]
    fn cli_rejects_zero_polling_values() {
        let err = Cli::try_parse_from(["localjob", "--max-polls", "0", "a.csv"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = Cli::try_parse_from(["localjob", "--poll-interval", "0", "a.csv"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let cli = Cli::parse_from(["localjob", "--max-polls", "1", "--poll-interval", "1", "a.csv"]);
        assert_eq!(cli.max_polls, Some(1));
        assert_eq!(cli.poll_interval, Some(1));
    }

    #[test]
    fn cli_rejects_extra_positional() {
        assert!(Cli::try_parse_from(["localjob", "a.csv", "b.csv"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "localjob",
            "--api-url",
            "http://flag:1/",
            "--poll-interval",
            "3",
            "--max-polls",
            "7",
            "--mime-type",
            "application/json",
            "--license-file",
            "site.gai_key",
            "-o",
            "out.json",
            "-v",
            "data.json",
        ]);
        let config = LocalJobConfig {
            api_url: "http://config:2/".into(),
            max_polls: Some(99),
            ..Default::default()
        };
        let (api_url, settings) = cli.settings(config);
        assert_eq!(api_url, "http://flag:1/");
        assert_eq!(settings.poll_interval, Duration::from_secs(3));
        assert_eq!(settings.max_polls, Some(7));
        assert_eq!(settings.form.mime_type, "application/json");
        assert_eq!(settings.license_file, PathBuf::from("site.gai_key"));
        assert_eq!(settings.output, Some(PathBuf::from("out.json")));
        assert!(cli.verbose);
    }

    #[test]
    fn config_used_when_flags_absent() {
        let cli = Cli::parse_from(["localjob", "data.csv"]);
        let mut config = LocalJobConfig {
            api_url: "http://config:2/".into(),
            license_file: Some(PathBuf::from("conf.gai_key")),
            poll_interval_secs: 30,
            max_polls: Some(4),
            ..Default::default()
        };
        config.job.pipeline = "dedupe".into();

        let (api_url, settings) = cli.settings(config);
        assert_eq!(api_url, "http://config:2/");
        assert_eq!(settings.license_file, PathBuf::from("conf.gai_key"));
        assert_eq!(settings.poll_interval, Duration::from_secs(30));
        assert_eq!(settings.max_polls, Some(4));
        assert_eq!(settings.form.pipeline, "dedupe");
        assert!(settings.output.is_none());
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
