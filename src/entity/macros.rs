/// Declares a dashboard record together with its `Draft` payload.
///
/// The generated record carries `id` and `created_at` in addition to the
/// listed fields; the draft carries only the listed fields. `unique = field`
/// names the field the backend rejects duplicates on.
#[macro_export]
macro_rules! dashboard_resource {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident ($kind:literal, unique = $unique:ident) {
            $( $(#[$field_meta:meta])* $field:ident : $field_ty:ty ),+ $(,)?
        }
    ) => {
        $crate::paste::paste! {
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
            $vis struct $name {
                pub id: String,
                pub created_at: ::chrono::DateTime<::chrono::Utc>,
                $( $(#[$field_meta])* pub $field: $field_ty, )+
            }

            #[doc = "Create/update payload for [`" $name "`]."]
            #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
            $vis struct [<$name Draft>] {
                $( $(#[$field_meta])* pub $field: $field_ty, )+
            }

            impl [<$name Draft>] {
                /// Builds a draft payload with all required fields.
                #[allow(clippy::too_many_arguments)]
                pub fn new($($field: $field_ty),+) -> Self {
                    Self {
                        $( $field, )+
                    }
                }
            }

            impl $crate::entity::Entity for $name {
                fn id(&self) -> &str {
                    &self.id
                }
            }

            impl $crate::entity::Resource for $name {
                const KIND: &'static str = $kind;
                type Draft = [<$name Draft>];

                fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                    self.created_at
                }

                fn from_draft(
                    id: String,
                    created_at: ::chrono::DateTime<::chrono::Utc>,
                    draft: Self::Draft,
                ) -> Self {
                    Self {
                        id,
                        created_at,
                        $( $field: draft.$field, )+
                    }
                }

                fn apply_draft(&mut self, draft: Self::Draft) {
                    $( self.$field = draft.$field; )+
                }

                fn unique_key(&self) -> &str {
                    &self.$unique
                }

                fn draft_unique_key(draft: &Self::Draft) -> &str {
                    &draft.$unique
                }
            }
        }
    };
}
