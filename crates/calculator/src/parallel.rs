use crate::error::{CalculatorError, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs `task` over every input with at most `limit` in flight and returns the
/// outputs in input order. The first failure is returned; tasks still running are
/// aborted when the set is dropped.
pub(crate) async fn ordered<I, T, F, Fut>(inputs: Vec<I>, limit: usize, task: F) -> Result<Vec<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let total = inputs.len();
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut tasks = JoinSet::new();

    for (idx, input) in inputs.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|err| CalculatorError::Worker(err.to_string()))?;
        let work = task(input);
        tasks.spawn(async move {
            let _permit = permit;
            (idx, work.await)
        });
    }

    let mut outputs: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
    while let Some(joined) = tasks.join_next().await {
        let (idx, output) = joined.map_err(|err| CalculatorError::Worker(err.to_string()))?;
        outputs[idx] = Some(output?);
    }

    outputs
        .into_iter()
        .enumerate()
        .map(|(idx, output)| {
            output.ok_or_else(|| CalculatorError::Worker(format!("no output for item {idx}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn keeps_input_order() {
        let outputs = ordered(vec![30u64, 10, 20, 0], 4, |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(delay)
        })
        .await
        .unwrap();
        assert_eq!(outputs, vec![30, 10, 20, 0]);
    }

    #[tokio::test]
    async fn never_exceeds_limit() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let outputs = ordered((0..12).collect(), 3, |idx: usize| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(idx)
            }
        })
        .await
        .unwrap();

        assert_eq!(outputs, (0..12).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn propagates_first_failure() {
        let result = ordered(vec![1, 2, 3], 2, |item| async move {
            if item == 2 {
                Err(CalculatorError::Worker("boom".to_string()))
            } else {
                Ok(item)
            }
        })
        .await;
        assert!(matches!(result, Err(CalculatorError::Worker(msg)) if msg == "boom"));
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let outputs: Vec<u8> = ordered(Vec::<u8>::new(), 4, |item| async move { Ok(item) })
            .await
            .unwrap();
        assert!(outputs.is_empty());
    }
}
