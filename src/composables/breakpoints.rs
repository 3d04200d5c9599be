//! 响应式断点 (Tailwind 默认值)

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    Sm,
    Md,
    Lg,
    Xl,
    Xxl,
}

impl Breakpoint {
    pub fn min_width(&self) -> u32 {
        match self {
            Breakpoint::Sm => 640,
            Breakpoint::Md => 768,
            Breakpoint::Lg => 1024,
            Breakpoint::Xl => 1280,
            Breakpoint::Xxl => 1536,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sm" => Some(Breakpoint::Sm),
            "md" => Some(Breakpoint::Md),
            "lg" => Some(Breakpoint::Lg),
            "xl" => Some(Breakpoint::Xl),
            "2xl" => Some(Breakpoint::Xxl),
            _ => None,
        }
    }
}

/// 某一窗口宽度下的断点快照
///
/// 注意这里的 mobile 是 `< md`，与界面状态里 `<= 768` 的判断不同。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoints {
    pub width: u32,
}

impl Breakpoints {
    pub fn new(width: u32) -> Self {
        Self { width }
    }

    fn between(&self, low: Breakpoint, high: Breakpoint) -> bool {
        self.width >= low.min_width() && self.width < high.min_width()
    }

    pub fn is_mobile(&self) -> bool {
        self.is_less_than(Breakpoint::Md)
    }

    pub fn is_tablet(&self) -> bool {
        self.between(Breakpoint::Md, Breakpoint::Lg)
    }

    pub fn is_desktop(&self) -> bool {
        self.is_greater_or_equal(Breakpoint::Lg)
    }

    pub fn is_small(&self) -> bool {
        self.is_less_than(Breakpoint::Sm)
    }

    pub fn is_medium(&self) -> bool {
        self.between(Breakpoint::Sm, Breakpoint::Md)
    }

    pub fn is_large(&self) -> bool {
        self.between(Breakpoint::Lg, Breakpoint::Xl)
    }

    pub fn is_xlarge(&self) -> bool {
        self.between(Breakpoint::Xl, Breakpoint::Xxl)
    }

    pub fn is_2xlarge(&self) -> bool {
        self.is_greater_or_equal(Breakpoint::Xxl)
    }

    pub fn is_greater_or_equal(&self, bp: Breakpoint) -> bool {
        self.width >= bp.min_width()
    }

    pub fn is_less_than(&self, bp: Breakpoint) -> bool {
        self.width < bp.min_width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_at_boundaries() {
        let bp = Breakpoints::new(767);
        assert!(bp.is_mobile() && bp.is_medium() && !bp.is_tablet());

        let bp = Breakpoints::new(768);
        assert!(bp.is_tablet() && !bp.is_mobile());

        let bp = Breakpoints::new(1024);
        assert!(bp.is_desktop() && bp.is_large());

        let bp = Breakpoints::new(1536);
        assert!(bp.is_2xlarge() && !bp.is_xlarge());

        assert!(Breakpoints::new(500).is_small());
    }

    #[test]
    fn named_lookup() {
        let bp = Breakpoints::new(1300);
        assert!(bp.is_greater_or_equal(Breakpoint::from_name("xl").unwrap()));
        assert!(bp.is_less_than(Breakpoint::from_name("2xl").unwrap()));
        assert_eq!(Breakpoint::from_name("3xl"), None);
    }
}
