//! Interface de terminal do localjob — spinners e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner exibido entre consultas de status
//! e `console` para estilização com cores. As linhas de progresso vão para
//! stdout; o spinner vai para stderr e some quando não há terminal.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use crate::job::{JobStatus, RunReport};

/// Saída visual de uma execução no terminal.
pub struct RunProgress {
    // Estilo verde para mensagens de sucesso.
    green: Style,
    // Estilo vermelho para mensagens de falha.
    red: Style,
    // Estilo amarelo para avisos.
    yellow: Style,
}

impl RunProgress {
    /// Cria a saída com os estilos verde, vermelho e amarelo.
    pub fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Licença válida encontrada no servidor.
    pub fn license_valid(&self, holder: &str) {
        println!("{} {holder}", self.green.apply_to("✓"));
    }

    /// Licença ausente ou inválida; o motivo é opcional.
    pub fn license_missing(&self, reason: Option<&str>) {
        match reason {
            Some(reason) => println!("{} License check failed: {reason}", self.yellow.apply_to("!")),
            None => println!(
                "{} License does not exist or is invalid.",
                self.yellow.apply_to("!")
            ),
        }
    }

    /// Resposta do envio da licença: código HTTP e corpo, como recebidos.
    pub fn license_uploaded(&self, status: u16, body: &str) {
        println!("{status}");
        println!("{body}");
    }

    /// Falha no envio da licença (arquivo ausente ou erro HTTP); não interrompe a execução.
    pub fn license_upload_failed(&self, reason: &str) {
        println!("{} {reason}", self.yellow.apply_to("!"));
    }

    /// Identificador devolvido pela criação do job.
    pub fn job_id(&self, job_id: &str) {
        println!("Job Id: {job_id}");
    }

    /// Status ainda não terminal e o intervalo até a próxima consulta.
    pub fn job_status(&self, status: &JobStatus, interval: Duration) {
        println!(
            "Job status: {status}. Checking again in {} seconds.",
            interval.as_secs()
        );
    }

    /// O servidor informou `Complete`.
    pub fn job_completed(&self) {
        println!("{} Job completed.", self.green.apply_to("✓"));
    }

    /// Imprime o resultado do job como JSON formatado.
    pub fn result(&self, result: &Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string())
        );
    }

    /// Inicia o spinner exibido enquanto se espera a próxima consulta.
    pub fn waiting(&self, interval: Duration) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Waiting {}s for next status check", interval.as_secs()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Imprime o resumo da execução formatado em JSON com estilo colorido.
    pub fn print_report(&self, report: &RunReport) {
        println!();
        println!("{}", self.green.apply_to("─── Run Report ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        );
    }

    /// Mensagem final de erro, em stderr.
    pub fn error(&self, message: &str) {
        eprintln!("{} Error: {message}", self.red.apply_to("✗"));
    }
}
