//! Forward Burrows-Wheeler transform.
//!
//! The transform is defined over suffixes rather than rotations: with `sa`
//! the suffix array of the block, the output holds the byte preceding each
//! suffix, the row belonging to suffix 0 is removed from the sequence, and
//! its position is reported as the 1-based primary index. The inverse in
//! [`crate::invert`] undoes exactly this construction.

/// Transform a block in place, returning the 1-based primary index.
///
/// Returns 0 only for an empty block, which callers are expected not to
/// pass; every non-empty block yields a primary index in `[1, N]`.
pub fn transform(block: &mut [u8]) -> u32 {
    let n = block.len();
    if n == 0 {
        return 0;
    }

    let sa = suffix_array(block);

    let mut out = vec![0u8; n];
    out[0] = block[n - 1];

    // Rows before the primary shift down one slot; rows after keep theirs.
    let mut primary = 0u32;
    for (i, &s) in sa.iter().enumerate() {
        if s == 0 {
            primary = i as u32 + 1;
        } else {
            let dst = if primary == 0 { i + 1 } else { i };
            out[dst] = block[s as usize - 1];
        }
    }

    block.copy_from_slice(&out);
    primary
}

/// Suffix array by prefix doubling.
///
/// Each round sorts suffixes by their first `2k` symbols using the ranks of
/// the previous round as a two-part key, then re-ranks. Terminates as soon
/// as all ranks are distinct, so runs in `O(n log² n)` worst case but exits
/// after a few rounds on typical data.
fn suffix_array(data: &[u8]) -> Vec<u32> {
    let n = data.len();
    let mut sa: Vec<u32> = (0..n as u32).collect();
    if n < 2 {
        return sa;
    }

    let mut rank: Vec<u32> = data.iter().map(|&b| u32::from(b)).collect();
    let mut tmp: Vec<u32> = vec![0; n];
    let mut key: Vec<u64> = vec![0; n];

    let mut k = 1usize;
    loop {
        // Key = (rank of suffix, rank of suffix k positions later + 1),
        // with 0 for suffixes shorter than k so they sort first.
        for i in 0..n {
            let tail = if i + k < n { rank[i + k] as u64 + 1 } else { 0 };
            key[i] = ((rank[i] as u64) << 32) | tail;
        }

        sa.sort_unstable_by_key(|&i| key[i as usize]);

        tmp[sa[0] as usize] = 0;
        for w in 1..n {
            let bump = u32::from(key[sa[w] as usize] != key[sa[w - 1] as usize]);
            tmp[sa[w] as usize] = tmp[sa[w - 1] as usize] + bump;
        }
        std::mem::swap(&mut rank, &mut tmp);

        if rank[sa[n - 1] as usize] as usize == n - 1 {
            break;
        }
        k *= 2;
    }

    sa
}
