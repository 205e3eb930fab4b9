//! Per-annotation time tracking.
//!
//! While an annotation is selected its `timestamp` holds the moment the
//! current measurement started. Accumulated seconds land in `anno_time`.

use web_time::{SystemTime, UNIX_EPOCH};

use crate::model::Annotation;

/// Wall clock in milliseconds, as used for annotation timestamps.
pub fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

pub fn start(annotation: &mut Annotation, now: f64) {
    annotation.timestamp = Some(now);
}

/// Add the time since the running measurement started and restart it.
pub fn accumulate(annotation: &mut Annotation, now: f64) {
    if let Some(started) = annotation.timestamp {
        annotation.anno_time += ((now - started) / 1000.0).max(0.0);
        annotation.timestamp = Some(now);
    }
}

pub fn stop(annotation: &mut Annotation, now: f64) {
    accumulate(annotation, now);
    annotation.timestamp = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::{AnnotationKind, AnnotationStatus};

    fn anno() -> Annotation {
        Annotation::new(0, AnnotationKind::Point, vec![Point::new(0.5, 0.5)], AnnotationStatus::Created)
    }

    #[test]
    fn selection_time_accumulates() {
        let mut a = anno();
        start(&mut a, 1_000.0);
        accumulate(&mut a, 3_500.0);
        assert!((a.anno_time - 2.5).abs() < 1e-9);
        stop(&mut a, 4_500.0);
        assert!((a.anno_time - 3.5).abs() < 1e-9);
        assert_eq!(a.timestamp, None);
    }

    #[test]
    fn stopped_timer_does_not_count() {
        let mut a = anno();
        accumulate(&mut a, 10_000.0);
        assert_eq!(a.anno_time, 0.0);
    }

    #[test]
    fn clock_is_after_epoch() {
        assert!(now_ms() > 0.0);
    }
}
