//! Configuração do localjob carregada a partir de `localjob.toml`.
//!
//! A struct [`LocalJobConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `LOCALJOB_API_URL` tem precedência sobre o arquivo;
//! flags da CLI têm precedência sobre ambos (ver [`crate::cli`]).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::{DEFAULT_API_URL, JobForm};
use crate::error::LocalJobError;

/// Arquivo de configuração procurado no diretório atual.
pub const CONFIG_FILE: &str = "localjob.toml";

/// Nome padrão do arquivo de licença, procurado ao lado do executável.
pub const LICENSE_FILE_NAME: &str = "your_license_file_name.gai_key";

/// Variável de ambiente que sobrescreve `api_url`.
pub const API_URL_ENV: &str = "LOCALJOB_API_URL";

/// Configuração de nível superior carregada de `localjob.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalJobConfig {
    /// URL base da API de jobs.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Arquivo de licença enviado quando o servidor não tem licença instalada.
    #[serde(default)]
    pub license_file: Option<PathBuf>,

    /// Intervalo em segundos entre consultas de status.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Limite opcional de consultas de status; sem limite quando ausente.
    #[serde(default)]
    pub max_polls: Option<u32>,

    /// Campos de formulário enviados com cada job.
    #[serde(default)]
    pub job: JobForm,
}

// Valor padrão para a URL da API: "http://localhost:9090/".
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

// Valor padrão para o intervalo de consulta: 10s.
fn default_poll_interval_secs() -> u64 {
    10
}

impl Default for LocalJobConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            license_file: None,
            poll_interval_secs: default_poll_interval_secs(),
            max_polls: None,
            job: JobForm::default(),
        }
    }
}

impl LocalJobConfig {
    /// Carrega a configuração do caminho informado ou de `localjob.toml`.
    ///
    /// Um caminho explícito que não existe é erro; o arquivo padrão ausente
    /// resulta nos valores padrão.
    pub fn load(path: Option<&Path>) -> Result<Self, LocalJobError> {
        Self::load_with_env(path, std::env::var(API_URL_ENV).ok())
    }

    fn load_with_env(
        path: Option<&Path>,
        env_api_url: Option<String>,
    ) -> Result<Self, LocalJobError> {
        let mut config = match path {
            Some(path) if !path.exists() => {
                return Err(LocalJobError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE).exists() => Self::from_file(Path::new(CONFIG_FILE))?,
            None => Self::default(),
        };

        // Variável de ambiente tem precedência sobre o arquivo de configuração.
        if let Some(url) = env_api_url
            && !url.is_empty()
        {
            config.api_url = url;
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, LocalJobError> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str::<LocalJobConfig>(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejeita intervalo zero (consulta em laço sem pausa) e `max_polls = 0`.
    fn validate(&self) -> Result<(), LocalJobError> {
        if self.poll_interval_secs == 0 {
            return Err(LocalJobError::Config(
                "poll_interval_secs must be at least 1".into(),
            ));
        }
        if self.max_polls == Some(0) {
            return Err(LocalJobError::Config("max_polls must be at least 1".into()));
        }
        Ok(())
    }

    /// Caminho do arquivo de licença: o configurado ou o padrão ao lado do executável.
    pub fn license_path(&self) -> PathBuf {
        self.license_file.clone().unwrap_or_else(default_license_path)
    }
}

/// `LICENSE_FILE_NAME` no diretório do executável; relativo ao diretório
/// atual se o executável não puder ser localizado.
pub fn default_license_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(LICENSE_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(LICENSE_FILE_NAME))
}
