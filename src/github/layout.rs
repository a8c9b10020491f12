use crate::models::{LayoutInput, LayoutPatch, LayoutTarget};

const SPACING: f64 = 10.0;
/// The page is laid out with this many `.container` elements when its
/// structure is the one we know how to shift.
const EXPECTED_CONTAINERS: usize = 4;

pub fn update_layout(input: &LayoutInput) -> LayoutPatch {
    let pushed = input.sidebar_width + SPACING;

    if input.container_count == EXPECTED_CONTAINERS {
        let auto_margin_left = (input.body_width - input.container_width) / 2.0;
        let should_push_left = input.sidebar_visible && auto_margin_left <= pushed;
        return LayoutPatch {
            target: LayoutTarget::Containers,
            margin_left: should_push_left.then_some(pushed),
        };
    }

    // Page structure changed; shift the whole document instead.
    LayoutPatch {
        target: LayoutTarget::Document,
        margin_left: input.sidebar_visible.then_some(pushed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(visible: bool, count: usize, body: f64, container: f64) -> LayoutInput {
        LayoutInput {
            sidebar_visible: visible,
            sidebar_width: 232.0,
            container_count: count,
            body_width: body,
            container_width: container,
        }
    }

    #[test]
    fn test_narrow_page_pushes_containers() {
        let patch = update_layout(&input(true, 4, 1280.0, 980.0));
        assert_eq!(patch.target, LayoutTarget::Containers);
        assert_eq!(patch.margin_left, Some(242.0));
    }

    #[test]
    fn test_wide_page_keeps_auto_margin() {
        let patch = update_layout(&input(true, 4, 1920.0, 980.0));
        assert_eq!(patch.margin_left, None);
    }

    #[test]
    fn test_hidden_sidebar_clears() {
        assert_eq!(update_layout(&input(false, 4, 1280.0, 980.0)).margin_left, None);
        assert_eq!(update_layout(&input(false, 2, 1280.0, 980.0)).margin_left, None);
    }

    #[test]
    fn test_unknown_structure_falls_back_to_document() {
        let patch = update_layout(&input(true, 1, 1920.0, 980.0));
        assert_eq!(patch.target, LayoutTarget::Document);
        assert_eq!(patch.margin_left, Some(242.0));
    }
}
