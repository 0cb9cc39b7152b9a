use crate::errors::CamscoutError;
use sdp_types::{Attribute, Media, Session};

/// Elementary stream formats the validator knows how to set up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaFormat {
    H264 { parameters: Option<String> },
    H265 { parameters: Option<String> },
    Mjpeg,
    Aac { clock_rate: u32, channels: u16 },
    Opus { channels: u16 },
    Pcmu,
    Pcma,
    Unsupported { encoding: String },
}

impl MediaFormat {
    /// Work out the format of an SDP media section from its payload type,
    /// `rtpmap` and `fmtp` attributes.
    pub fn from_media(media: &Media) -> Self {
        let payload_type = media.fmt.split_whitespace().next().unwrap_or("");

        let rtpmap = find_payload_attribute(&media.attributes, "rtpmap", payload_type);
        let parameters = find_payload_attribute(&media.attributes, "fmtp", payload_type)
            .map(str::to_string);

        let Some(rtpmap) = rtpmap else {
            // Static payload types from RFC 3551
            return match payload_type {
                "0" => MediaFormat::Pcmu,
                "8" => MediaFormat::Pcma,
                "26" => MediaFormat::Mjpeg,
                other => MediaFormat::Unsupported {
                    encoding: format!("payload type {}", other),
                },
            };
        };

        let mut fields = rtpmap.split('/');
        let encoding = fields.next().unwrap_or("").trim();
        let clock_rate = fields
            .next()
            .and_then(|r| r.trim().parse().ok())
            .unwrap_or(0);
        let channels = fields
            .next()
            .and_then(|c| c.trim().parse().ok())
            .unwrap_or(1);

        match encoding.to_ascii_uppercase().as_str() {
            "H264" => MediaFormat::H264 { parameters },
            "H265" | "HEVC" => MediaFormat::H265 { parameters },
            "JPEG" => MediaFormat::Mjpeg,
            "MPEG4-GENERIC" | "MP4A-LATM" => MediaFormat::Aac {
                clock_rate,
                channels,
            },
            "OPUS" => MediaFormat::Opus { channels },
            "PCMU" => MediaFormat::Pcmu,
            "PCMA" => MediaFormat::Pcma,
            _ => MediaFormat::Unsupported {
                encoding: encoding.to_string(),
            },
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, MediaFormat::Unsupported { .. })
    }

    pub fn is_video(&self) -> bool {
        matches!(
            self,
            MediaFormat::H264 { .. } | MediaFormat::H265 { .. } | MediaFormat::Mjpeg
        )
    }

    pub fn name(&self) -> &str {
        match self {
            MediaFormat::H264 { .. } => "H264",
            MediaFormat::H265 { .. } => "H265",
            MediaFormat::Mjpeg => "MJPEG",
            MediaFormat::Aac { .. } => "AAC",
            MediaFormat::Opus { .. } => "Opus",
            MediaFormat::Pcmu => "PCMU",
            MediaFormat::Pcma => "PCMA",
            MediaFormat::Unsupported { encoding } => encoding,
        }
    }
}

/// Value of an `a=<name>:<pt> <value>` attribute for the given payload type
fn find_payload_attribute<'a>(
    attributes: &'a [Attribute],
    name: &str,
    payload_type: &str,
) -> Option<&'a str> {
    attributes.iter().find_map(|attr| {
        if attr.attribute != name {
            return None;
        }
        let value = attr.value.as_deref()?;
        let (pt, rest) = value.split_once(' ')?;
        (pt == payload_type).then(|| rest.trim())
    })
}

fn find_control(attributes: &[Attribute]) -> Option<String> {
    attributes
        .iter()
        .find(|attr| attr.attribute == "control")
        .and_then(|attr| attr.value.clone())
}

/// One `m=` section of a session description
#[derive(Debug, Clone)]
pub struct MediaDescription {
    /// "video", "audio", "application"...
    pub kind: String,
    pub payload_type: Option<u8>,
    pub control: Option<String>,
    pub format: MediaFormat,
}

/// Session description returned by a successful DESCRIBE
#[derive(Debug, Clone)]
pub struct SessionDescription {
    pub raw: String,
    /// Content-Base of the DESCRIBE response, or the request URL
    pub base_url: String,
    pub medias: Vec<MediaDescription>,
}

impl SessionDescription {
    pub fn parse(base_url: &str, raw: &str) -> Result<Self, CamscoutError> {
        let session = Session::parse(raw.as_bytes())
            .map_err(|e| CamscoutError::Sdp(format!("{:?}", e)))?;

        let base_url = match find_control(&session.attributes) {
            Some(control) if is_absolute(&control) => control,
            _ => base_url.to_string(),
        };

        let medias = session
            .medias
            .iter()
            .map(|media| MediaDescription {
                kind: media.media.clone(),
                payload_type: media
                    .fmt
                    .split_whitespace()
                    .next()
                    .and_then(|pt| pt.parse().ok()),
                control: find_control(&media.attributes),
                format: MediaFormat::from_media(media),
            })
            .collect();

        Ok(Self {
            raw: raw.to_string(),
            base_url,
            medias,
        })
    }

    /// First supported video media, falling back to any supported media
    pub fn select_media(&self) -> Option<&MediaDescription> {
        self.medias
            .iter()
            .find(|m| m.format.is_video())
            .or_else(|| self.medias.iter().find(|m| m.format.is_supported()))
    }

    /// URL to SETUP `media` on
    pub fn control_url(&self, media: &MediaDescription) -> String {
        match media.control.as_deref() {
            Some(control) if is_absolute(control) => control.to_string(),
            Some(control) if !control.is_empty() && control != "*" => {
                format!("{}/{}", self.base_url.trim_end_matches('/'), control)
            }
            _ => self.base_url.clone(),
        }
    }
}

fn is_absolute(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("rtsp://") || lower.starts_with("rtsps://")
}
