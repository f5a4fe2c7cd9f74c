//! Produce 指标收集模块
//!
//! 记录 token、提交与确认计数，以及 token 大小分布。

use metrics::{counter, gauge, histogram};

/// 记录一个 token 被切分出来
pub fn record_token(len: usize) {
    counter!("streamcast_tokens_total").increment(1);
    histogram!("streamcast_token_bytes").record(len as f64);
}

/// 记录一个 RecordUnit 已提交给投递客户端
pub fn record_unit_submitted(topic: &str) {
    counter!(
        "streamcast_units_submitted_total",
        "topic" => topic.to_string()
    )
    .increment(1);
}

/// 记录一次投递确认
pub fn record_unit_acknowledged(topic: &str) {
    counter!(
        "streamcast_units_acknowledged_total",
        "topic" => topic.to_string()
    )
    .increment(1);
}

/// 记录一次投递失败
pub fn record_delivery_failure(topic: &str) {
    counter!(
        "streamcast_delivery_failures_total",
        "topic" => topic.to_string()
    )
    .increment(1);
}

/// 记录在途 (已提交未完成) 的 unit 数
pub fn record_in_flight(in_flight: u64) {
    gauge!("streamcast_units_in_flight").set(in_flight as f64);
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.0}, max={:.0}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
