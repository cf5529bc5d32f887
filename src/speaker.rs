//! Two-party speaker labeling from silence gaps.
//!
//! A heuristic, not diarization: a long silence between consecutive segments
//! is read as a turn change between two conversational parties. When the
//! overall gap pattern does not look like a dialogue, the labeling reverts
//! to a single party rather than presenting noise as turn-taking.

use crate::defaults;
use crate::transcript::Segment;

/// Label segments `Party1`/`Party2` based on inter-segment gaps.
///
/// Uses the default gap threshold of
/// [`defaults::SPEAKER_GAP_THRESHOLD_S`] seconds.
pub fn assign_speakers(segments: &[Segment]) -> Vec<Segment> {
    assign_speakers_with_threshold(segments, defaults::SPEAKER_GAP_THRESHOLD_S)
}

pub fn assign_speakers_with_threshold(segments: &[Segment], gap_threshold: f64) -> Vec<Segment> {
    if segments.is_empty() {
        return Vec::new();
    }
    if segments.len() == 1 {
        let mut only = segments[0].clone();
        only.speaker = Some("Party1".to_string());
        return vec![only];
    }

    let mut labeled = Vec::with_capacity(segments.len());
    let mut current_speaker = 1u8;
    let mut prev_speaker = 1u8;
    let mut prev_end = 0.0f64;
    let mut speaker_changes = 0u32;
    let mut significant_gaps = 0usize;
    let mut gap_durations = Vec::with_capacity(segments.len() - 1);

    for (i, segment) in segments.iter().enumerate() {
        let gap = segment.start - prev_end;

        if i > 0 {
            gap_durations.push(gap);
            if gap > gap_threshold {
                significant_gaps += 1;
            }
        }

        let mut copy = segment.clone();
        if i == 0 {
            copy.speaker = Some(format!("Party{current_speaker}"));
            prev_speaker = current_speaker;
        } else if gap > gap_threshold {
            if speaker_changes == 0 {
                // The first turn change always hands off to the second party
                current_speaker = 2;
                speaker_changes += 1;
            } else {
                current_speaker = (prev_speaker % 2) + 1;
            }
            copy.speaker = Some(format!("Party{current_speaker}"));
            prev_speaker = current_speaker;
        } else {
            copy.speaker = Some(format!("Party{prev_speaker}"));
        }

        labeled.push(copy);
        prev_end = segment.end;
    }

    // All segments landed on one party; nothing to second-guess
    let unanimous = labeled
        .iter()
        .all(|s| s.speaker == labeled[0].speaker);
    if unanimous {
        return labeled;
    }

    let total_gaps = gap_durations.len();
    if total_gaps > 0 {
        let gap_ratio = significant_gaps as f64 / total_gaps as f64;
        let avg_gap = gap_durations.iter().sum::<f64>() / total_gaps as f64;

        // Sparse significant gaps, or few turn changes with short average
        // silences, mean the "dialogue" reading is unreliable
        if gap_ratio < defaults::SPEAKER_GAP_RATIO_MIN
            || (speaker_changes < 2
                && avg_gap < gap_threshold * defaults::SPEAKER_AVG_GAP_FACTOR)
        {
            for segment in &mut labeled {
                segment.speaker = Some("Party1".to_string());
            }
        }
    }

    labeled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64) -> Segment {
        Segment::new("بات چیت", start, end)
    }

    fn speakers(segments: &[Segment]) -> Vec<&str> {
        segments
            .iter()
            .map(|s| s.speaker.as_deref().unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(assign_speakers(&[]).is_empty());
    }

    #[test]
    fn test_single_segment_is_party1() {
        let out = assign_speakers(&[seg(0.0, 5.0)]);
        assert_eq!(out[0].speaker.as_deref(), Some("Party1"));
    }

    #[test]
    fn test_no_gaps_stays_party1() {
        let out = assign_speakers(&[seg(0.0, 5.0), seg(5.5, 10.0), seg(10.2, 15.0)]);
        assert_eq!(speakers(&out), vec!["Party1", "Party1", "Party1"]);
    }

    #[test]
    fn test_alternating_dialogue() {
        // Every gap is well over the threshold, so parties alternate and
        // the labeling stands
        let out = assign_speakers(&[
            seg(0.0, 2.0),
            seg(9.0, 11.0),
            seg(18.0, 20.0),
            seg(27.0, 29.0),
        ]);
        assert_eq!(speakers(&out), vec!["Party1", "Party2", "Party1", "Party2"]);
    }

    #[test]
    fn test_first_change_always_goes_to_party2() {
        let out = assign_speakers(&[seg(0.0, 2.0), seg(10.0, 12.0)]);
        assert_eq!(speakers(&out), vec!["Party1", "Party2"]);
    }

    #[test]
    fn test_reversion_when_significant_gaps_are_sparse() {
        // One big gap among many small ones: ratio 1/5 < 0.25, revert
        let out = assign_speakers(&[
            seg(0.0, 2.0),
            seg(2.1, 4.0),
            seg(4.1, 6.0),
            seg(13.0, 15.0),
            seg(15.1, 17.0),
            seg(17.1, 19.0),
        ]);
        assert!(out.iter().all(|s| s.speaker.as_deref() == Some("Party1")));
    }

    #[test]
    fn test_two_party_labeling_stands_for_clear_dialogue() {
        // Gap ratio 3/3 = 1.0 and long average gaps keep the labeling
        let out = assign_speakers(&[
            seg(0.0, 2.0),
            seg(9.0, 11.0),
            seg(18.0, 20.0),
            seg(27.0, 29.0),
        ]);
        let distinct: std::collections::HashSet<_> =
            out.iter().filter_map(|s| s.speaker.clone()).collect();
        assert_eq!(distinct.len(), 2);
    }

    #[test]
    fn test_short_average_gap_reverts_two_segment_dialogue() {
        // Ratio is 1/1 but the average gap (3.5s) is under 1.5x the
        // threshold and only one change was counted
        let out = assign_speakers(&[seg(0.0, 2.0), seg(5.5, 8.0)]);
        assert_eq!(speakers(&out), vec!["Party1", "Party1"]);
    }

    #[test]
    fn test_gap_exactly_at_threshold_is_not_a_change() {
        let out = assign_speakers(&[seg(0.0, 2.0), seg(5.0, 7.0)]);
        assert_eq!(speakers(&out), vec!["Party1", "Party1"]);
    }

    #[test]
    fn test_text_and_timestamps_untouched() {
        let input = vec![seg(0.0, 2.0), seg(10.0, 12.0)];
        let out = assign_speakers(&input);
        assert_eq!(out[0].text, input[0].text);
        assert_eq!(out[1].start, 10.0);
        assert_eq!(out[1].end, 12.0);
    }

    #[test]
    fn test_custom_threshold() {
        // 2s gaps flip with a 1s threshold
        let out = assign_speakers_with_threshold(
            &[seg(0.0, 1.0), seg(3.0, 4.0), seg(6.0, 7.0), seg(9.0, 10.0)],
            1.0,
        );
        assert_eq!(speakers(&out), vec!["Party1", "Party2", "Party1", "Party2"]);
    }
}
