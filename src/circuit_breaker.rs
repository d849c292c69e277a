use failsafe::{backoff, failure_policy, Config, StateMachine};
use std::time::Duration;

/// Breaker type guarding outbound messaging calls.
pub type MessagingCircuitBreaker =
    StateMachine<failure_policy::ConsecutiveFailures<backoff::Exponential>, ()>;

/// Creates a circuit breaker for the messaging provider so a provider outage
/// fails sends fast instead of stacking up 30s timeouts.
///
/// # Configuration
///
/// - **Failure threshold**: 5 consecutive failures triggers OPEN state.
/// - **Backoff**: Exponential backoff from 10s to 60s before attempting recovery.
///
/// # States
///
/// - **CLOSED**: Normal operation, messages go out.
/// - **OPEN**: Too many failures, sends are rejected immediately.
/// - **HALF_OPEN**: Testing if the provider recovered.
pub fn create_messaging_circuit_breaker() -> MessagingCircuitBreaker {
    let backoff_strategy = backoff::exponential(
        Duration::from_secs(10), // Initial delay
        Duration::from_secs(60), // Maximum delay
    );

    let failure_policy = failure_policy::consecutive_failures(5, backoff_strategy);

    Config::new().failure_policy(failure_policy).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use failsafe::{CircuitBreaker, Error};

    #[test]
    fn test_circuit_breaker_opens_after_failures() {
        let cb = create_messaging_circuit_breaker();

        for _ in 0..5 {
            let result: Result<(), Error<&str>> = cb.call(|| Err::<(), &str>("provider down"));
            assert!(result.is_err());
        }

        let result: Result<(), Error<&str>> = cb.call(|| Ok::<(), &str>(()));
        assert!(matches!(result, Err(Error::Rejected)));
    }

    #[test]
    fn test_circuit_breaker_allows_success() {
        let cb = create_messaging_circuit_breaker();

        let result: Result<&str, Error<&str>> = cb.call(|| Ok::<&str, &str>("wamid.1"));

        assert_eq!(result.unwrap(), "wamid.1");
    }

    #[test]
    fn test_breaker_is_shared_between_clones() {
        let cb = create_messaging_circuit_breaker();
        let clone = cb.clone();

        for _ in 0..5 {
            let _: Result<(), Error<&str>> = clone.call(|| Err::<(), &str>("provider down"));
        }

        assert!(!cb.is_call_permitted());
    }
}
