//! Streaming manifest validation
//!
//! Structural checks for HLS (`.m3u8`) and DASH (`.mpd`) manifests used by
//! the broadcast health checker. The HLS check also reports the first media
//! segment URI, resolved against the manifest URL, for reachability probing.

use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use url::Url;

/// Validate an HLS manifest
///
/// Returns the first media segment URL when the playlist carries segments.
pub fn check_hls(content: &str, base_url: &Url) -> std::result::Result<Option<Url>, String> {
    let first_line = content.lines().next().unwrap_or("");
    if !first_line.starts_with("#EXTM3U") {
        return Err("Invalid HLS manifest: Missing #EXTM3U header".to_string());
    }

    let mut has_segments = false;
    let mut has_playlists = false;
    let mut segment_url = None;

    for line in content.lines() {
        if line.starts_with("#EXT-X-STREAM-INF:") {
            has_playlists = true;
        } else if line.starts_with("#EXTINF:") {
            has_segments = true;
        } else if has_segments && !line.starts_with('#') && !line.trim().is_empty() {
            segment_url = base_url.join(line.trim()).ok();
            break;
        }
    }

    if !(has_segments || has_playlists) {
        return Err("No segments or variant playlists found".to_string());
    }

    Ok(segment_url)
}

/// Validate a DASH manifest
///
/// The root element must be `MPD` with at least one `Period`, one
/// `AdaptationSet` and one `Representation`.
pub fn check_dash(content: &str) -> std::result::Result<(), String> {
    let mut reader = Reader::from_str(content);

    let mut seen_root = false;
    let mut root_is_mpd = false;
    let mut periods = 0u32;
    let mut adaptation_sets = 0u32;
    let mut representations = 0u32;

    loop {
        match reader.read_event() {
            Ok(XmlEvent::Start(e)) | Ok(XmlEvent::Empty(e)) => {
                let name = e.local_name();
                let name = name.as_ref();
                if !seen_root {
                    seen_root = true;
                    root_is_mpd = name == b"MPD";
                }
                match name {
                    b"Period" => periods += 1,
                    b"AdaptationSet" => adaptation_sets += 1,
                    b"Representation" => representations += 1,
                    _ => {}
                }
            }
            Ok(XmlEvent::Eof) => break,
            Err(e) => return Err(format!("Invalid DASH manifest XML: {}", e)),
            _ => {}
        }
    }

    if !seen_root || !root_is_mpd {
        return Err("Invalid DASH manifest: Root element is not MPD".to_string());
    }
    if periods == 0 {
        return Err("No Period found in DASH manifest".to_string());
    }
    if adaptation_sets == 0 {
        return Err("No AdaptationSet found in DASH manifest".to_string());
    }
    if representations == 0 {
        return Err("No Representation found in DASH manifest".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://cdn.example.com/live/index.m3u8").unwrap()
    }

    const MEDIA_PLAYLIST: &str = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-TARGETDURATION:6\n\
#EXTINF:6.0,\n\
segment-001.ts\n\
#EXTINF:6.0,\n\
segment-002.ts\n";

    const MASTER_PLAYLIST: &str = "#EXTM3U\n\
#EXT-X-STREAM-INF:BANDWIDTH=1280000,RESOLUTION=1280x720\n\
720p/index.m3u8\n";

    const DASH_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" type="dynamic">
  <Period id="1">
    <AdaptationSet mimeType="video/mp4">
      <Representation id="720p" bandwidth="1280000"/>
    </AdaptationSet>
  </Period>
</MPD>"#;

    #[test]
    fn test_media_playlist_reports_first_segment() {
        let segment = check_hls(MEDIA_PLAYLIST, &base()).unwrap();
        assert_eq!(
            segment.unwrap().as_str(),
            "https://cdn.example.com/live/segment-001.ts"
        );
    }

    #[test]
    fn test_master_playlist_has_no_segment() {
        let segment = check_hls(MASTER_PLAYLIST, &base()).unwrap();
        assert!(segment.is_none());
    }

    #[test]
    fn test_hls_missing_header() {
        let err = check_hls("#EXT-X-VERSION:3\n", &base()).unwrap_err();
        assert!(err.contains("#EXTM3U"));
    }

    #[test]
    fn test_hls_empty_playlist() {
        let err = check_hls("#EXTM3U\n#EXT-X-VERSION:3\n", &base()).unwrap_err();
        assert!(err.contains("No segments"));
    }

    #[test]
    fn test_valid_dash() {
        assert!(check_dash(DASH_MANIFEST).is_ok());
    }

    #[test]
    fn test_dash_wrong_root() {
        let err = check_dash("<SmoothStreamingMedia></SmoothStreamingMedia>").unwrap_err();
        assert!(err.contains("Root element is not MPD"));
    }

    #[test]
    fn test_dash_missing_period() {
        let err =
            check_dash(r#"<MPD xmlns="urn:mpeg:dash:schema:mpd:2011"></MPD>"#).unwrap_err();
        assert!(err.contains("No Period"));
    }

    #[test]
    fn test_dash_broken_xml() {
        let err = check_dash("<MPD><Period></MPD>").unwrap_err();
        assert!(err.contains("Invalid DASH manifest XML"));
    }
}
