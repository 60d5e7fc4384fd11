/// Cumulative network counters (system-wide, all interfaces aggregated)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Total bytes transmitted since the interfaces came up
    pub bytes_sent: u64,
    /// Total bytes received since the interfaces came up
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    /// Receive errors
    pub err_in: u64,
    /// Transmit errors
    pub err_out: u64,
    /// Incoming packets dropped
    pub drop_in: u64,
    /// Outgoing packets dropped
    pub drop_out: u64,
    /// FIFO buffer errors while receiving
    pub fifo_in: u64,
    /// FIFO buffer errors while sending
    pub fifo_out: u64,
}

impl CounterSnapshot {
    /// Field-by-field difference against an earlier snapshot.
    ///
    /// Counters are unsigned, so a counter that reset or wrapped shows up as
    /// the modular difference rather than a negative value.
    pub fn delta_since(&self, previous: &CounterSnapshot) -> DeltaRow {
        DeltaRow {
            bytes_sent: self.bytes_sent.wrapping_sub(previous.bytes_sent),
            bytes_recv: self.bytes_recv.wrapping_sub(previous.bytes_recv),
            packets_sent: self.packets_sent.wrapping_sub(previous.packets_sent),
            packets_recv: self.packets_recv.wrapping_sub(previous.packets_recv),
            err_in: self.err_in.wrapping_sub(previous.err_in),
            err_out: self.err_out.wrapping_sub(previous.err_out),
            drop_in: self.drop_in.wrapping_sub(previous.drop_in),
            drop_out: self.drop_out.wrapping_sub(previous.drop_out),
            fifo_in: self.fifo_in.wrapping_sub(previous.fifo_in),
            fifo_out: self.fifo_out.wrapping_sub(previous.fifo_out),
        }
    }

    /// Add another interface's counters into this aggregate
    pub fn accumulate(&mut self, other: &CounterSnapshot) {
        self.bytes_sent = self.bytes_sent.wrapping_add(other.bytes_sent);
        self.bytes_recv = self.bytes_recv.wrapping_add(other.bytes_recv);
        self.packets_sent = self.packets_sent.wrapping_add(other.packets_sent);
        self.packets_recv = self.packets_recv.wrapping_add(other.packets_recv);
        self.err_in = self.err_in.wrapping_add(other.err_in);
        self.err_out = self.err_out.wrapping_add(other.err_out);
        self.drop_in = self.drop_in.wrapping_add(other.drop_in);
        self.drop_out = self.drop_out.wrapping_add(other.drop_out);
        self.fifo_in = self.fifo_in.wrapping_add(other.fifo_in);
        self.fifo_out = self.fifo_out.wrapping_add(other.fifo_out);
    }
}

/// One second of network activity, derived from two consecutive snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaRow {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub err_in: u64,
    pub err_out: u64,
    pub drop_in: u64,
    pub drop_out: u64,
    pub fifo_in: u64,
    pub fifo_out: u64,
}

impl DeltaRow {
    /// Sent + received bytes
    pub fn total_bytes(&self) -> u64 {
        self.bytes_sent.wrapping_add(self.bytes_recv)
    }

    /// Sent + received packets
    pub fn total_packets(&self) -> u64 {
        self.packets_sent.wrapping_add(self.packets_recv)
    }

    /// Render as one CSV line (newline included), columns in header order.
    pub fn to_csv_row(&self, timestamp: &str) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
            timestamp,
            self.total_bytes(),
            self.bytes_sent,
            self.bytes_recv,
            self.total_packets(),
            self.packets_sent,
            self.packets_recv,
            self.err_in,
            self.err_out,
            self.drop_in,
            self.drop_out,
            self.fifo_in,
            self.fifo_out,
        )
    }
}
