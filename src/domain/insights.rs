// Threshold-triggered qualitative insights
use super::aggregate::BaseAverages;
use serde::{Deserialize, Serialize};

pub const TEMP_HIGH: &str = "Engine temperature is running high. Review cooling and airflow.";
pub const TEMP_CRITICAL: &str = "Critical engine temperature. Reduce load and inspect the cooling system.";
pub const SPEED_LOW: &str = "Average speed is low. Look for time in braking zones and corner exits.";
pub const SPEED_HIGH: &str = "Very high average speed. Keep an eye on tyre and brake wear.";
pub const FUEL_LOW: &str = "Fuel level is low. Plan the next fuel stop.";
pub const FUEL_CRITICAL: &str = "Critical fuel level. Refuel immediately.";
pub const RPM_HIGH: &str = "RPM is running high. Consider earlier upshifts.";
pub const RPM_CRITICAL: &str = "Critical RPM levels. Risk of engine damage.";
pub const THERMAL_RPM_EXCELLENT: &str = "Excellent thermal management and RPM control.";
pub const FUEL_GOOD: &str = "Good fuel efficiency. Reserve is healthy.";
pub const OPTIMAL: &str = "All systems nominal. Performance is optimal.";

/// Thresholds for the insight checks. Message texts are fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightRules {
    pub temp_high: i64,
    pub temp_critical: i64,
    pub speed_low: i64,
    pub speed_high: i64,
    pub fuel_low: i64,
    pub fuel_critical: i64,
    pub rpm_high: i64,
    pub rpm_critical: i64,
    pub excellent_temp: i64,
    pub excellent_rpm: i64,
    pub good_fuel: i64,
}

impl Default for InsightRules {
    fn default() -> Self {
        Self {
            temp_high: 200,
            temp_critical: 220,
            speed_low: 120,
            speed_high: 180,
            fuel_low: 30,
            fuel_critical: 15,
            rpm_high: 8500,
            rpm_critical: 9500,
            excellent_temp: 180,
            excellent_rpm: 7500,
            good_fuel: 60,
        }
    }
}

impl InsightRules {
    /// Run every check in order and collect the messages that fire.
    ///
    /// "High" and "critical" bands of a metric are disjoint, so at most one
    /// of the pair fires. Low-side checks skip averages of zero, which mean
    /// no data rather than an empty tank or a parked car.
    pub fn generate(&self, averages: &BaseAverages) -> Vec<String> {
        let BaseAverages {
            avg_speed,
            avg_rpm,
            avg_temp,
            avg_fuel,
        } = *averages;

        let checks: [(bool, &str); 10] = [
            (avg_temp > self.temp_high && avg_temp <= self.temp_critical, TEMP_HIGH),
            (avg_temp > self.temp_critical, TEMP_CRITICAL),
            (avg_speed > 0 && avg_speed < self.speed_low, SPEED_LOW),
            (avg_speed > self.speed_high, SPEED_HIGH),
            (avg_fuel >= self.fuel_critical && avg_fuel < self.fuel_low, FUEL_LOW),
            (avg_fuel > 0 && avg_fuel < self.fuel_critical, FUEL_CRITICAL),
            (avg_rpm > self.rpm_high && avg_rpm <= self.rpm_critical, RPM_HIGH),
            (avg_rpm > self.rpm_critical, RPM_CRITICAL),
            (
                avg_temp > 0
                    && avg_temp < self.excellent_temp
                    && avg_rpm > 0
                    && avg_rpm < self.excellent_rpm,
                THERMAL_RPM_EXCELLENT,
            ),
            (avg_fuel > self.good_fuel, FUEL_GOOD),
        ];

        let insights: Vec<String> = checks
            .into_iter()
            .filter(|(matched, _)| *matched)
            .map(|(_, message)| message.to_string())
            .collect();

        if insights.is_empty() {
            vec![OPTIMAL.to_string()]
        } else {
            insights
        }
    }
}

/// Insights with the stock thresholds.
pub fn generate_insights(averages: &BaseAverages) -> Vec<String> {
    InsightRules::default().generate(averages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ideal_metrics_only_positive() {
        let insights = generate_insights(&BaseAverages::new(150, 7000, 170, 70));
        assert_eq!(insights, vec![THERMAL_RPM_EXCELLENT, FUEL_GOOD]);
    }

    #[test]
    fn test_fallback_when_nothing_matches() {
        // mid-range everywhere: no warning, no praise
        let insights = generate_insights(&BaseAverages::new(150, 8000, 190, 50));
        assert_eq!(insights, vec![OPTIMAL]);
    }

    #[test]
    fn test_warning_order() {
        let insights = generate_insights(&BaseAverages::new(100, 9000, 210, 20));
        assert_eq!(insights, vec![TEMP_HIGH, SPEED_LOW, FUEL_LOW, RPM_HIGH]);
    }

    #[test]
    fn test_critical_levels() {
        let insights = generate_insights(&BaseAverages::new(190, 9800, 240, 10));
        assert_eq!(insights, vec![TEMP_CRITICAL, SPEED_HIGH, FUEL_CRITICAL, RPM_CRITICAL]);
    }

    #[test]
    fn test_zero_averages_do_not_raise_low_warnings() {
        let insights = generate_insights(&BaseAverages::default());
        assert_eq!(insights, vec![OPTIMAL]);
    }

    #[test]
    fn test_custom_thresholds() {
        let rules = InsightRules {
            good_fuel: 80,
            ..InsightRules::default()
        };
        let insights = rules.generate(&BaseAverages::new(150, 7000, 170, 70));
        assert_eq!(insights, vec![THERMAL_RPM_EXCELLENT]);
    }
}
