use ndarray::Array2;

/// Area of the largest 4-connected component in a binary mask, via
/// two-pass labeling with union-find.
pub(crate) fn largest_component_area(mask: &Array2<bool>) -> usize {
    let (h, w) = mask.dim();
    if h == 0 || w == 0 {
        return 0;
    }

    let mut labels = Array2::<u32>::zeros((h, w));
    let mut next_label: u32 = 1;
    let mut parent: Vec<u32> = vec![0; h * w / 2 + 2];

    fn find(parent: &[u32], mut label: u32) -> u32 {
        while parent[label as usize] != label {
            label = parent[label as usize];
        }
        label
    }

    fn union(parent: &mut [u32], a: u32, b: u32) {
        let ra = find(parent, a);
        let rb = find(parent, b);
        if ra != rb {
            parent[rb as usize] = ra;
        }
    }

    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }
            let up = if row > 0 { labels[[row - 1, col]] } else { 0 };
            let left = if col > 0 { labels[[row, col - 1]] } else { 0 };

            match (up > 0, left > 0) {
                (false, false) => {
                    if next_label as usize >= parent.len() {
                        parent.resize(parent.len() * 2, 0);
                    }
                    parent[next_label as usize] = next_label;
                    labels[[row, col]] = next_label;
                    next_label += 1;
                }
                (true, false) => labels[[row, col]] = up,
                (false, true) => labels[[row, col]] = left,
                (true, true) => {
                    let smaller = up.min(left);
                    labels[[row, col]] = smaller;
                    if up != left {
                        union(&mut parent, smaller, up.max(left));
                    }
                }
            }
        }
    }

    let mut areas = vec![0usize; next_label as usize];
    for row in 0..h {
        for col in 0..w {
            let lbl = labels[[row, col]];
            if lbl > 0 {
                areas[find(&parent, lbl) as usize] += 1;
            }
        }
    }
    areas.into_iter().max().unwrap_or(0)
}
