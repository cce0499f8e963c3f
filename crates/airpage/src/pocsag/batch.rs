// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batch framing: preamble, sync words, and frame-slot placement.

use super::codeword::address_slot;
use super::{BATCH_SLOTS, IDLE_CODEWORD, PREAMBLE_LENGTH, PREAMBLE_WORD, SYNC_WORD};

/// Assemble the full codeword sequence of one transmission.
///
/// The preamble is emitted once, followed by one or more batches. Each
/// batch opens with the sync word and carries 16 slots initialized to the
/// idle codeword. The address codeword occupies slot `(ric & 7) * 2` of
/// the first batch; message codewords fill the slots after it in order.
/// Batches after the first start filling payload from slot 0 so long
/// messages waste no slots on a repeated address.
pub fn assemble_transmission(ric: u32, address_cw: u32, message_cws: &[u32]) -> Vec<u32> {
    let address_pos = address_slot(ric);

    let mut out = Vec::with_capacity(PREAMBLE_LENGTH + 2 * (1 + BATCH_SLOTS));
    out.extend(std::iter::repeat(PREAMBLE_WORD).take(PREAMBLE_LENGTH));

    let mut next = 0usize;
    let mut batch_count = 0usize;

    loop {
        out.push(SYNC_WORD);
        let mut slots = [IDLE_CODEWORD; BATCH_SLOTS];

        let start_idx = if batch_count == 0 {
            slots[address_pos] = address_cw;
            address_pos + 1
        } else {
            0
        };

        for slot in slots.iter_mut().skip(start_idx) {
            if next >= message_cws.len() {
                break;
            }
            *slot = message_cws[next];
            next += 1;
        }
        out.extend_from_slice(&slots);
        batch_count += 1;

        if next >= message_cws.len() {
            break;
        }
    }

    log::debug!(
        "[pocsag] assembled {} batch(es), address slot {}, {} message codeword(s)",
        batch_count,
        address_pos,
        message_cws.len()
    );
    out
}

/// Expand codewords into the transmitted bit order, MSB-first per word.
pub fn codewords_to_bits(codewords: &[u32]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(codewords.len() * 32);
    for &cw in codewords {
        for shift in (0..32).rev() {
            bits.push(((cw >> shift) & 1) as u8);
        }
    }
    bits
}
