// WebVTT subtitle format
use super::{SubtitleCue, SubtitleFormatter};

pub struct VttFormatter;

impl SubtitleFormatter for VttFormatter {
    fn format(&self, cues: &[SubtitleCue]) -> String {
        let mut output = String::from("WEBVTT\n\n");

        for cue in cues {
            output.push_str(&format!(
                "{} --> {}\n{}\n\n",
                format_timestamp(cue.start),
                format_timestamp(cue.end),
                voice(cue)
            ));
        }

        output
    }

    fn extension(&self) -> &'static str {
        "vtt"
    }
}

fn voice(cue: &SubtitleCue) -> String {
    if cue.speaker.is_empty() {
        cue.text.clone()
    } else {
        format!("<v {}>{}", cue.speaker, cue.text)
    }
}

fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(1.5), "00:00:01.500");
    }

    #[test]
    fn test_vtt_format() {
        let cues = vec![SubtitleCue {
            start: 1.5,
            end: 4.0,
            speaker: "Speaker 1".to_string(),
            text: "Hello, world!".to_string(),
        }];

        let output = VttFormatter.format(&cues);

        assert!(output.starts_with("WEBVTT\n\n"));
        assert!(output.contains("00:00:01.500 --> 00:00:04.000\n<v Speaker 1>Hello, world!"));
    }
}
