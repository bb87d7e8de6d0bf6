use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use parley_llm::{Format, WireFormat};
use stt::TranscriptionFormat;
use tts::{AudioFormat, SpeechModel, Voice};

/// Command-line client for the vendor's chat, embedding, speech,
/// transcription and cost endpoints
#[derive(Debug, Parser)]
#[command(name = "parley", version, about)]
pub struct Args {
    /// Path to configuration file; the environment alone is used when absent
    #[arg(short, long, default_value = "parley.toml", env = "PARLEY_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a prompt and print the reply
    Chat {
        /// Model identifier; defaults to `openai.default_model`
        #[arg(short, long)]
        model: Option<String>,

        /// Print the reply as it is generated
        #[arg(long)]
        stream: bool,

        /// Response format: `none`, `text` or `json`
        #[arg(long, value_parser = str::parse::<Format>)]
        format: Option<Format>,

        /// Wire format; overrides `openai.wire_format`
        #[arg(long, value_enum)]
        wire: Option<Wire>,

        /// System instructions placed before the prompt
        #[arg(long)]
        system: Option<String>,

        #[arg(long)]
        temperature: Option<f64>,

        prompt: String,
    },

    /// Print one embedding per input as a JSON array
    Embed {
        #[arg(short, long)]
        model: Option<String>,

        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Synthesize speech into a file
    Speak {
        text: String,

        #[arg(short, long)]
        out: PathBuf,

        #[arg(short, long, value_parser = str::parse::<SpeechModel>)]
        model: Option<SpeechModel>,

        #[arg(long, value_parser = str::parse::<Voice>)]
        voice: Option<Voice>,

        #[arg(long, value_parser = str::parse::<AudioFormat>)]
        format: Option<AudioFormat>,

        #[arg(long)]
        speed: Option<f64>,
    },

    /// Transcribe an audio file
    Transcribe {
        file: PathBuf,

        /// ISO 639-1 language hint
        #[arg(short, long)]
        language: Option<String>,

        #[arg(long)]
        prompt: Option<String>,

        #[arg(long, value_parser = str::parse::<TranscriptionFormat>)]
        format: Option<TranscriptionFormat>,
    },

    /// Print organization costs as JSON; needs `openai.admin_api_key`
    Costs {
        /// Start of the range, Unix seconds
        #[arg(long)]
        start: u64,

        /// End of the range, Unix seconds
        #[arg(long)]
        end: Option<u64>,

        #[arg(long)]
        bucket_width: Option<String>,

        #[arg(long, value_delimiter = ',')]
        project_ids: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        group_by: Vec<String>,

        #[arg(long)]
        limit: Option<u32>,

        /// Cursor from a previous page
        #[arg(long)]
        page: Option<String>,
    },
}

/// Chat wire format as spelled on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Wire {
    Responses,
    Chat,
}

impl From<Wire> for WireFormat {
    fn from(wire: Wire) -> Self {
        match wire {
            Wire::Responses => Self::Responses,
            Wire::Chat => Self::ChatCompletions,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_chat_flags() {
        let args = Args::parse_from(["parley", "chat", "--stream", "--wire", "chat", "--format", "json", "Hello"]);
        let Command::Chat {
            stream, wire, format, prompt, ..
        } = args.command
        else {
            panic!("expected chat");
        };
        assert!(stream);
        assert!(matches!(wire, Some(Wire::Chat)));
        assert!(matches!(format, Some(Format::Json)));
        assert_eq!(prompt, "Hello");
    }

    #[test]
    fn parses_cost_lists() {
        let args = Args::parse_from(["parley", "costs", "--start", "100", "--group-by", "project_id,line_item"]);
        let Command::Costs {
            start, group_by, end, ..
        } = args.command
        else {
            panic!("expected costs");
        };
        assert_eq!(start, 100);
        assert_eq!(end, None);
        assert_eq!(group_by, ["project_id", "line_item"]);
    }

    #[test]
    fn rejects_unknown_voice() {
        let err = Args::try_parse_from(["parley", "speak", "hi", "--out", "a.aac", "--voice", "bogus"]).unwrap_err();
        assert!(err.to_string().contains("expected one of"));
    }
}
