#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::io::Write;

use args::{Args, Command};
use clap::Parser;
use futures_util::StreamExt;
use parley_config::Config;
use parley_embeddings::{EmbeddingRequest, Embeddings};
use parley_llm::{Chat, ChatOptions, Delta, Prompt, StreamEvent, WireFormat};
use parley_usage::{CostQuery, Costs};
use stt::{Transcriber, TranscriptionRequest};
use tts::{Speech, SpeechRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        Config::from_env()?
    };

    parley_telemetry::init(&config.telemetry, "warn")?;

    tracing::debug!(config_path = %args.config.display(), "starting parley");

    match args.command {
        Command::Chat {
            model,
            stream,
            format,
            wire,
            system,
            temperature,
            prompt,
        } => {
            let mut openai = config.openai;
            if let Some(wire) = wire {
                openai.wire_format = WireFormat::from(wire);
            }
            let chat = Chat::from_config(&openai)?;

            let mut conversation = Prompt::new();
            if let Some(system) = system {
                conversation = conversation.system(system);
            }
            let conversation = conversation.user(prompt);

            let mut options = ChatOptions::default();
            if let Some(format) = format {
                options = options.format(format);
            }
            if let Some(temperature) = temperature {
                options = options.temperature(temperature);
            }

            let model = model.unwrap_or_else(|| chat.default_model().to_owned());
            if stream {
                stream_reply(&chat, &conversation, &model, &options).await?;
            } else {
                let response = chat.complete(&conversation, &model, &options).await?;
                println!("{}", response.text());
            }
        }
        Command::Embed { model, texts } => {
            let embeddings = Embeddings::from_config(&config.openai)?;
            let mut request = EmbeddingRequest::new(texts);
            if let Some(model) = model {
                request = request.with_model(model);
            }

            for embedding in embeddings.embed(request).await?.embeddings {
                println!("{}", serde_json::to_string(&embedding)?);
            }
        }
        Command::Speak {
            text,
            out,
            model,
            voice,
            format,
            speed,
        } => {
            let speech = Speech::from_config(&config.openai)?;
            let request = SpeechRequest {
                input: text,
                model,
                voice,
                format,
                speed,
            };

            let response = speech.synthesize(&request).await?;
            tokio::fs::write(&out, &response.audio)
                .await
                .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", out.display()))?;

            tracing::info!(path = %out.display(), content_type = %response.content_type, bytes = response.audio.len(), "audio written");
        }
        Command::Transcribe {
            file,
            language,
            prompt,
            format,
        } => {
            let transcriber = Transcriber::from_config(&config.openai)?;
            let audio = tokio::fs::read(&file)
                .await
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
            let filename = file
                .file_name()
                .map_or_else(|| "audio".to_owned(), |name| name.to_string_lossy().into_owned());

            let mut request = TranscriptionRequest::new(filename, audio);
            request.language = language;
            request.prompt = prompt;
            request.format = format;

            println!("{}", transcriber.transcribe(request).await?.text);
        }
        Command::Costs {
            start,
            end,
            bucket_width,
            project_ids,
            group_by,
            limit,
            page,
        } => {
            let costs = Costs::from_config(&config.openai)?;
            let query = CostQuery {
                start_time: start,
                end_time: end,
                bucket_width,
                project_ids,
                group_by,
                limit,
                page,
            };

            let page = costs.get(&query).await?;
            println!("{}", serde_json::to_string_pretty(&page.raw)?);
        }
    }

    Ok(())
}

/// Print text deltas as they arrive
async fn stream_reply(chat: &Chat, prompt: &Prompt, model: &str, options: &ChatOptions) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    let mut events = std::pin::pin!(chat.stream(prompt, model, options));

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::Delta(Delta::Text(text)) => {
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
            }
            StreamEvent::Delta(Delta::Thinking(_)) => {}
            StreamEvent::Completed(response) => {
                writeln!(stdout)?;
                tracing::debug!(total_tokens = response.usage.total_tokens, "stream finished");
            }
        }
    }

    Ok(())
}
