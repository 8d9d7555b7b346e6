use crate::output::print_json;
use anyhow::Context;
use certify_core::config::Config;
use certify_core::contact::{ContactForm, ContactRequest};
use certify_core::error::CertifyError;
use clap::Args;
use std::path::Path;

#[derive(Args)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub message: String,
    /// Override the configured delay (milliseconds)
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,
}

pub fn run(root: &Path, args: ContactArgs, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load_or_default(root).context("failed to load config")?;
    if let Some(ms) = args.delay_ms {
        config.contact.delay_ms = ms;
    }

    let request = ContactRequest {
        name: args.name,
        email: args.email,
        company: args.company,
        message: args.message,
    };
    let form = ContactForm::from_config(&config.contact);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start runtime")?;

    if !json {
        println!("Sending...");
    }
    let receipt = match runtime.block_on(form.submit(&request)) {
        Ok(r) => r,
        Err(CertifyError::Validation(errors)) => {
            anyhow::bail!("contact form incomplete: {errors}");
        }
        Err(e) => return Err(e).context("failed to send contact form"),
    };

    if json {
        print_json(&receipt)?;
    } else {
        println!("Thanks, {}! We'll be in touch at {}.", request.name, request.email);
    }
    Ok(())
}
