use std::collections::VecDeque;

const DEFAULT_HISTORY_SIZE: usize = 60;

/// Fixed-length rolling buffers behind the sparklines.
///
/// Every buffer always holds exactly `capacity` points (older points fall
/// off the front), so a chart is always as wide as the area it is drawn in.
#[derive(Debug, Clone)]
pub struct MetricsHistory {
    capacity: usize,
    pub power_watts: VecDeque<f64>,
    pub gpu_usage: VecDeque<f64>,
    pub link_in: VecDeque<f64>,
    pub link_out: VecDeque<f64>,
}

impl MetricsHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            power_watts: VecDeque::from(vec![0.0; capacity]),
            gpu_usage: VecDeque::from(vec![0.0; capacity]),
            link_in: VecDeque::from(vec![0.0; capacity]),
            link_out: VecDeque::from(vec![0.0; capacity]),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the visible width, keeping the most recent points.
    pub fn resize(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        if capacity == self.capacity {
            return;
        }
        for queue in [
            &mut self.power_watts,
            &mut self.gpu_usage,
            &mut self.link_in,
            &mut self.link_out,
        ] {
            while queue.len() > capacity {
                queue.pop_front();
            }
            while queue.len() < capacity {
                queue.push_front(0.0);
            }
        }
        self.capacity = capacity;
    }

    pub fn push_power(&mut self, watts: f64) {
        Self::push_value(&mut self.power_watts, watts, self.capacity);
    }

    pub fn push_gpu(&mut self, percent: f64) {
        Self::push_value(&mut self.gpu_usage, percent, self.capacity);
    }

    pub fn push_link(&mut self, bytes_in: f64, bytes_out: f64) {
        Self::push_value(&mut self.link_in, bytes_in, self.capacity);
        Self::push_value(&mut self.link_out, bytes_out, self.capacity);
    }

    fn push_value(queue: &mut VecDeque<f64>, value: f64, capacity: usize) {
        if queue.len() >= capacity {
            queue.pop_front();
        }
        queue.push_back(value);
    }

    /// Mean of the non-zero points, 0.0 if there are none.
    pub fn average_nonzero(queue: &VecDeque<f64>) -> f64 {
        let (sum, count) = queue
            .iter()
            .filter(|v| **v > 0.0)
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count > 0 {
            sum / count as f64
        } else {
            0.0
        }
    }

    /// Scale a buffer into sparkline bar heights, `ceiling` mapping to `levels`.
    pub fn scaled(queue: &VecDeque<f64>, ceiling: f64, levels: u64) -> Vec<u64> {
        if ceiling <= 0.0 {
            return vec![0; queue.len()];
        }
        queue
            .iter()
            .map(|v| {
                let scaled = (v / ceiling * levels as f64) as u64;
                // anything non-zero stays visible
                if *v > 0.0 && scaled == 0 {
                    1
                } else {
                    scaled.min(levels)
                }
            })
            .collect()
    }
}

impl Default for MetricsHistory {
    fn default() -> Self {
        Self::new()
    }
}
