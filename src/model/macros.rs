/// Declares a benchmark entity with three observable `i32` properties
/// (`X`, `Y`, `Z`) notified through the given notifier type.
///
/// The notifier type must be in scope at the call site and take the entity
/// as its single type parameter. The expression after `=` builds it.
///
/// # Example
///
/// ```rust
/// use bindable::{test_model, StackedNotifier, TestModel};
///
/// test_model! {
///     /// A stacked model that shares the thread's stack.
///     pub struct SharedStackModel uses StackedNotifier = StackedNotifier::per_thread();
/// }
///
/// let model = SharedStackModel::default();
/// assert!(model.set_x(1));
/// assert_eq!(model.x(), 1);
/// assert_eq!(SharedStackModel::NAME, "SharedStackModel");
/// ```
#[macro_export]
macro_rules! test_model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident uses $notifier:ident = $init:expr;
    ) => {
        $(#[$meta])*
        $vis struct $name {
            x: ::core::cell::Cell<i32>,
            y: ::core::cell::Cell<i32>,
            z: ::core::cell::Cell<i32>,
            notifier: $notifier<$name>,
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                Self {
                    x: ::core::cell::Cell::new(0),
                    y: ::core::cell::Cell::new(0),
                    z: ::core::cell::Cell::new(0),
                    notifier: $init,
                }
            }
        }

        impl $crate::notify::Bindable for $name {
            type Notifier = $notifier<$name>;

            #[inline]
            fn notifier(&self) -> &Self::Notifier {
                &self.notifier
            }
        }

        impl $crate::model::TestModel for $name {
            const NAME: &'static str = ::core::stringify!($name);

            #[inline]
            fn x(&self) -> i32 {
                self.x.get()
            }

            #[inline]
            fn set_x(&self, value: i32) -> bool {
                $crate::notify::Bindable::set_property(self, &self.x, value, $crate::model::PROPERTY_X)
            }

            #[inline]
            fn y(&self) -> i32 {
                self.y.get()
            }

            #[inline]
            fn set_y(&self, value: i32) -> bool {
                $crate::notify::Bindable::set_property(self, &self.y, value, $crate::model::PROPERTY_Y)
            }

            #[inline]
            fn z(&self) -> i32 {
                self.z.get()
            }

            #[inline]
            fn set_z(&self, value: i32) -> bool {
                $crate::notify::Bindable::set_property(self, &self.z, value, $crate::model::PROPERTY_Z)
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_struct(::core::stringify!($name))
                    .field("x", &self.x.get())
                    .field("y", &self.y.get())
                    .field("z", &self.z.get())
                    .field("notifier", &self.notifier)
                    .finish()
            }
        }
    };
}
